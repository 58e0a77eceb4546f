/// Vertex structure with camera-space position, screen position, and normal
#[derive(Clone, Debug)]
pub struct Vertex {
    pub position: [f64; 3],
    pub screen_position: [f64; 2],
    pub normal: [f64; 3],
}
