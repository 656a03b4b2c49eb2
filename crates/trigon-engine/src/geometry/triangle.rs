use super::Vertex;

/// The demo triangle in normalized device coordinates.
pub static TRIANGLE: [Vertex; 3] = [
    Vertex::new(-0.5, -0.5, 0.0),
    Vertex::new(0.5, -0.5, 0.0),
    Vertex::new(0.0, 0.5, 0.0),
];

/// Raw bytes of [`TRIANGLE`], tightly packed, ready for upload.
pub fn triangle_bytes() -> &'static [u8] {
    bytemuck::cast_slice(&TRIANGLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_vertices_of_three_floats() {
        assert_eq!(TRIANGLE.len(), 3);
        assert_eq!(triangle_bytes().len(), 3 * 3 * std::mem::size_of::<f32>());
    }

    #[test]
    fn bytes_match_reference_floats() {
        let expected: [f32; 9] = [-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0];
        let expected_bytes: Vec<u8> = expected.iter().flat_map(|f| f.to_ne_bytes()).collect();
        assert_eq!(triangle_bytes(), expected_bytes.as_slice());
    }

    #[test]
    fn layout_consumes_whole_buffer() {
        let layout = Vertex::layout();
        assert_eq!(triangle_bytes().len() as u64 % layout.stride, 0);
        assert_eq!(layout.vertex_count(triangle_bytes().len() as u64), 3);
    }
}
