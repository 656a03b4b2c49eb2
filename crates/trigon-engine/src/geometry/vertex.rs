use bytemuck::{Pod, Zeroable};

/// Data type of one vertex attribute as stored in a vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    pub const fn components(self) -> u32 {
        match self {
            VertexFormat::Float32 => 1,
            VertexFormat::Float32x2 => 2,
            VertexFormat::Float32x3 => 3,
            VertexFormat::Float32x4 => 4,
        }
    }

    /// Size in bytes.
    pub const fn size(self) -> u64 {
        self.components() as u64 * 4
    }
}

/// Where one attribute lives inside a vertex and which shader location reads it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u64,
}

/// Describes how the bytes of a vertex buffer are split into attributes.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct VertexLayout {
    /// Distance in bytes between consecutive vertices.
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(stride: u64) -> Self {
        Self {
            stride,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, location: u32, format: VertexFormat, offset: u64) -> Self {
        self.attributes.push(VertexAttribute {
            location,
            format,
            offset,
        });
        self
    }

    pub fn attribute(&self, location: u32) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.location == location)
    }

    /// Number of whole vertices in a buffer of `byte_len` bytes.
    pub fn vertex_count(&self, byte_len: u64) -> u64 {
        if self.stride == 0 { 0 } else { byte_len / self.stride }
    }

    /// Checks that every attribute fits inside one stride and that no shader
    /// location is described twice.
    pub fn validate(&self) -> Result<(), String> {
        if self.stride == 0 {
            return Err("vertex stride is zero".to_string());
        }
        if self.attributes.is_empty() {
            return Err("vertex layout has no attributes".to_string());
        }

        for (i, attr) in self.attributes.iter().enumerate() {
            let end = attr.offset + attr.format.size();
            if end > self.stride {
                return Err(format!(
                    "attribute at location {} ends at byte {end}, past the stride of {}",
                    attr.location, self.stride
                ));
            }
            if self.attributes[..i].iter().any(|a| a.location == attr.location) {
                return Err(format!("location {} is described twice", attr.location));
            }
        }

        Ok(())
    }
}

/// Position-only vertex, three tightly packed `f32`s.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }

    /// Position at shader location 0, starting at the first byte of each vertex.
    pub fn layout() -> VertexLayout {
        VertexLayout::new(std::mem::size_of::<Vertex>() as u64).with_attribute(
            0,
            VertexFormat::Float32x3,
            0,
        )
    }
}
