/// 3D vector
pub type Vec3 = [f32; 3];
/// 4D vector
pub type Vec4 = [f32; 4];
/// Quaternion
pub type Quat = [f32; 4];
/// 4x4 matrix, arranged in columns
pub type Mat4 = [Vec4; 4];

pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Reinterprets a pointer to 3 floats as a `Vec3`.
#[inline]
pub(crate) unsafe fn vec3<'a>(ptr: *const f32) -> &'a Vec3 {
    &*(ptr as *const Vec3)
}

/// Reinterprets a pointer to 16 floats (column major) as a `Mat4`.
#[inline]
pub(crate) unsafe fn mat4<'a>(ptr: *const f32) -> &'a Mat4 {
    &*(ptr as *const Mat4)
}

/// Strided view over a vertex buffer handed out by the engine.
///
/// Vertices are `stride` bytes apart and the first 3 floats of each one are
/// its position.
#[derive(Debug, Clone, Copy)]
pub struct Vertices<'a> {
    ptr: *const u8,
    count: usize,
    stride: usize,
    _phantom: std::marker::PhantomData<&'a f32>,
}

impl<'a> Vertices<'a> {
    pub(crate) unsafe fn from_raw(ptr: *const f32, count: usize, stride: usize) -> Self {
        Self {
            ptr: ptr as *const u8,
            count,
            stride,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Creates a view over tightly packed `Vec3`s.
    pub fn packed(vertices: &'a [Vec3]) -> Self {
        unsafe {
            Self::from_raw(
                vertices.as_ptr() as *const f32,
                vertices.len(),
                std::mem::size_of::<Vec3>(),
            )
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        if index < self.count {
            // vertex data is not necessarily aligned to the stride
            unsafe {
                let ptr = self.ptr.add(index * self.stride) as *const Vec3;
                Some(ptr.read_unaligned())
            }
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec3> + 'a {
        let vertices = *self;
        (0..vertices.count).filter_map(move |i| vertices.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strided_vertices() {
        // position + one padding float per vertex
        let data = [1.0f32, 2.0, 3.0, -1.0, 4.0, 5.0, 6.0, -1.0];
        let vertices = unsafe { Vertices::from_raw(data.as_ptr(), 2, 16) };

        assert_eq!(2, vertices.len());
        assert_eq!(Some([1.0, 2.0, 3.0]), vertices.get(0));
        assert_eq!(Some([4.0, 5.0, 6.0]), vertices.get(1));
        assert_eq!(None, vertices.get(2));
    }

    #[test]
    fn packed_vertices() {
        let faces = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let collected: Vec<Vec3> = Vertices::packed(&faces).iter().collect();
        assert_eq!(&faces[..], &collected[..]);
    }
}
