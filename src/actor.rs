use std::f64::consts::FRAC_PI_2;

use rand::Rng;

use crate::color::Rgb;
use crate::field::SimParams;
use crate::math::{self, Mat3, Vec3};

/// The four cardinal roll directions on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosZ,
        Direction::NegZ,
    ];

    /// Unit travel vector.
    pub fn vector(self) -> Vec3 {
        match self {
            Direction::PosX => [1.0, 0.0, 0.0],
            Direction::NegX => [-1.0, 0.0, 0.0],
            Direction::PosZ => [0.0, 0.0, 1.0],
            Direction::NegZ => [0.0, 0.0, -1.0],
        }
    }

    /// The horizontal axis a cube tips forward about when rolling this way.
    pub fn axis(self) -> Vec3 {
        match self {
            Direction::PosX => [0.0, 0.0, -1.0],
            Direction::NegX => [0.0, 0.0, 1.0],
            Direction::PosZ => [1.0, 0.0, 0.0],
            Direction::NegZ => [-1.0, 0.0, 0.0],
        }
    }
}

/// Motion phase of one actor.
///
/// `Rolling` carries snapshots of the pre-roll pose; every mid-roll pose is
/// recomputed from those snapshots rather than from the previous frame, so
/// floating-point error never accumulates across a roll.
#[derive(Clone, Copy, Debug)]
pub enum Phase {
    Idle {
        wait_ms: f64,
    },
    Rolling {
        progress: f64,
        direction: Direction,
        pivot: Vec3,
        start_position: Vec3,
        start_orientation: Mat3,
    },
}

/// One cube in the field. At rest its position is on the integer lattice
/// (y = 0) and its orientation is a signed permutation matrix.
#[derive(Clone, Debug)]
pub struct Actor {
    position: Vec3,
    orientation: Mat3,
    phase: Phase,
    color: Rgb,
}

impl Actor {
    /// Creates an actor at a random lattice cell with a random initial wait.
    pub fn spawn<R: Rng>(params: &SimParams, rng: &mut R) -> Self {
        Actor {
            position: random_cell(params.spawn_range, rng),
            orientation: math::identity(),
            phase: Phase::Idle {
                wait_ms: rng.gen_range(0.0..params.max_wait_ms),
            },
            color: pick_color(&params.palette, rng),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Mat3 {
        self.orientation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase(), Phase::Idle { .. })
    }

    /// Advances the actor by one animation step of `elapsed_ms` wall-clock
    /// milliseconds. Roll progress itself moves in fixed per-step increments.
    pub fn step<R: Rng>(&mut self, elapsed_ms: f64, params: &SimParams, rng: &mut R) {
        match self.phase {
            Phase::Idle { wait_ms } => {
                let remaining = wait_ms - elapsed_ms.max(0.0);
                if remaining <= 0.0 {
                    let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
                    self.begin_roll(direction);
                } else {
                    self.phase = Phase::Idle { wait_ms: remaining };
                }
            }
            Phase::Rolling {
                progress,
                direction,
                pivot,
                start_position,
                start_orientation,
            } => {
                let progress = progress + params.speed;
                if progress >= 1.0 {
                    self.finish_roll(direction, start_position, start_orientation, params, rng);
                } else {
                    let angle = FRAC_PI_2 * progress;
                    let rotation = math::rotation_about_axis(&direction.axis(), angle);
                    let offset = math::sub(&start_position, &pivot);
                    self.position =
                        math::add(&pivot, &math::multiply_matrix_vector(&rotation, &offset));
                    self.orientation = math::multiply_matrices(&rotation, &start_orientation);
                    self.phase = Phase::Rolling {
                        progress,
                        direction,
                        pivot,
                        start_position,
                        start_orientation,
                    };
                }
            }
        }
    }

    /// Starts a roll toward `direction`. The pivot is the midpoint of the
    /// leading bottom edge: half a cell forward, half a cell down.
    pub(crate) fn begin_roll(&mut self, direction: Direction) {
        let travel = direction.vector();
        let pivot = [
            self.position[0] + travel[0] * 0.5,
            self.position[1] - 0.5,
            self.position[2] + travel[2] * 0.5,
        ];
        self.phase = Phase::Rolling {
            progress: 0.0,
            direction,
            pivot,
            start_position: self.position,
            start_orientation: self.orientation,
        };
    }

    /// Snaps the completed roll to exact lattice coordinates and an exact
    /// quarter-turn, then recycles the actor if it left the spawn range.
    fn finish_roll<R: Rng>(
        &mut self,
        direction: Direction,
        start_position: Vec3,
        start_orientation: Mat3,
        params: &SimParams,
        rng: &mut R,
    ) {
        self.position = math::add(&start_position, &direction.vector());
        self.orientation =
            math::multiply_matrices(&math::quarter_turn(&direction.axis()), &start_orientation);
        self.phase = Phase::Idle {
            wait_ms: rng.gen_range(0.0..params.max_wait_ms),
        };

        let range = params.spawn_range as f64;
        if self.position[0].abs() > range || self.position[2].abs() > range {
            tracing::debug!(
                x = self.position[0],
                z = self.position[2],
                "actor left spawn range, recycling"
            );
            self.recycle(params, rng);
        }
    }

    /// Hard recycle: fresh random cell, identity orientation, fresh wait.
    fn recycle<R: Rng>(&mut self, params: &SimParams, rng: &mut R) {
        self.position = random_cell(params.spawn_range, rng);
        self.orientation = math::identity();
        self.phase = Phase::Idle {
            wait_ms: rng.gen_range(0.0..params.max_wait_ms),
        };
        self.color = pick_color(&params.palette, rng);
    }

    #[cfg(test)]
    pub(crate) fn at(position: Vec3) -> Self {
        Actor {
            position,
            orientation: math::identity(),
            phase: Phase::Idle { wait_ms: f64::MAX },
            color: Rgb::new(255, 255, 255),
        }
    }
}

fn random_cell<R: Rng>(spawn_range: i64, rng: &mut R) -> Vec3 {
    [
        rng.gen_range(-spawn_range..=spawn_range) as f64,
        0.0,
        rng.gen_range(-spawn_range..=spawn_range) as f64,
    ]
}

fn pick_color<R: Rng>(palette: &[Rgb], rng: &mut R) -> Rgb {
    palette[rng.gen_range(0..palette.len())]
}
