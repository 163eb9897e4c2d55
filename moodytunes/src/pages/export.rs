pub const MAX_COVER_IMAGE_KB: u64 = 256;

// Spotify rejects playlist cover images over 256 kB.
pub fn cover_image_too_large(size_bytes: f64) -> bool {
    (size_bytes / 1024.0).round() > MAX_COVER_IMAGE_KB as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_image_limit_rounds_to_kilobytes() {
        assert!(!cover_image_too_large(256.0 * 1024.0));
        assert!(!cover_image_too_large(256.4 * 1024.0));
        assert!(cover_image_too_large(256.6 * 1024.0));
    }
}
