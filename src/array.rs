//! Element-wise copies between buffers shared with the engine.
use std::ptr;

/// Copies the first `len` floats of `src` into `dst`.
///
/// # Panics
///
/// If `len` is larger than either slice.
pub fn copy_floats(dst: &mut [f32], src: &[f32], len: usize) {
    dst[..len].copy_from_slice(&src[..len]);
}

/// Copies the first `len` shorts of `src` into `dst`.
///
/// # Panics
///
/// If `len` is larger than either slice.
pub fn copy_shorts(dst: &mut [i16], src: &[i16], len: usize) {
    dst[..len].copy_from_slice(&src[..len]);
}

/// Copies `len` floats from `src` to `dst` without any bounds checking.
///
/// # Safety
///
/// Both pointers must be valid for `len` elements and must not overlap.
pub unsafe fn copy_floats_raw(dst: *mut f32, src: *const f32, len: usize) {
    ptr::copy_nonoverlapping(src, dst, len)
}

/// Copies `len` shorts from `src` to `dst` without any bounds checking.
///
/// # Safety
///
/// Both pointers must be valid for `len` elements and must not overlap.
pub unsafe fn copy_shorts_raw(dst: *mut i16, src: *const i16, len: usize) {
    ptr::copy_nonoverlapping(src, dst, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_three_floats() {
        let src = [1.0, 2.0, 3.0];
        let mut dst = [0.0; 3];
        copy_floats(&mut dst, &src, 3);

        assert_eq!([1.0, 2.0, 3.0], dst);
        assert_eq!([1.0, 2.0, 3.0], src);
    }

    #[test]
    fn copy_nothing() {
        let mut dst = [7.0f32; 4];
        copy_floats(&mut dst, &[], 0);
        assert_eq!([7.0; 4], dst);

        let mut dst = [7i16; 4];
        unsafe { copy_shorts_raw(dst.as_mut_ptr(), [1, 2].as_ptr(), 0) };
        assert_eq!([7; 4], dst);
    }

    #[test]
    fn copy_prefix() {
        let src: Vec<i16> = (0..16).collect();
        for len in 0..=src.len() {
            let mut dst = vec![-1i16; 16];
            copy_shorts(&mut dst, &src, len);
            assert_eq!(&src[..len], &dst[..len]);
            assert!(dst[len..].iter().all(|&s| s == -1));
        }
    }

    #[test]
    fn raw_copies_match_slices() {
        let src = [0.5f32, -0.25, 8.0, 1e-3];
        let mut dst = [0.0f32; 4];
        unsafe { copy_floats_raw(dst.as_mut_ptr(), src.as_ptr(), src.len()) };
        assert_eq!(src, dst);

        let src = [i16::MIN, 0, i16::MAX];
        let mut dst = [0i16; 3];
        unsafe { copy_shorts_raw(dst.as_mut_ptr(), src.as_ptr(), 3) };
        assert_eq!(src, dst);
    }

    #[test]
    #[should_panic]
    fn copy_past_the_end() {
        let mut dst = [0.0f32; 2];
        copy_floats(&mut dst, &[1.0, 2.0, 3.0], 3);
    }
}
