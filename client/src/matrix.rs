//! Matrix generation and console rendering.

use rand::Rng;

/// Side length above which [`render`] truncates the preview.
const PRINT_LIMIT: usize = 10;

/// Generates a `size` × `size` row-major matrix of uniform floats in
/// [0, 100).
pub fn random(size: u32) -> Vec<f32> {
    let elements = size as usize * size as usize;
    let mut rng = rand::thread_rng();
    (0..elements).map(|_| rng.gen_range(0.0f32..100.0)).collect()
}

/// Renders at most a 10 × 10 preview of the matrix, with `...` markers for
/// the truncated rows and columns.
pub fn render(matrix: &[f32], size: u32, title: &str) -> String {
    let mut out = format!("--- {title} ({size}x{size}) ---\n");
    if size == 0 || matrix.is_empty() {
        out.push_str("(empty matrix)\n");
        return out;
    }

    let side = size as usize;
    let limit = side.min(PRINT_LIMIT);
    for i in 0..limit {
        for j in 0..limit {
            out.push_str(&format!("{:8.2} ", matrix[i * side + j]));
        }
        if side > limit {
            out.push_str("...");
        }
        out.push('\n');
    }
    if side > limit {
        out.push_str("...\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_matrix_has_the_right_shape() {
        let matrix = random(7);
        assert_eq!(matrix.len(), 49);
        assert!(matrix.iter().all(|v| (0.0..100.0).contains(v)));
    }

    #[test]
    fn small_matrix_renders_in_full() {
        let rendered = render(&[1.0, 2.0, 3.0, 4.0], 2, "test");
        assert!(rendered.starts_with("--- test (2x2) ---"));
        assert_eq!(rendered.lines().count(), 3);
        assert!(!rendered.contains("..."));
    }

    #[test]
    fn large_matrix_preview_is_truncated() {
        let matrix = vec![1.0; 12 * 12];
        let rendered = render(&matrix, 12, "test");
        assert!(rendered.contains("..."));
        // Header, ten preview rows, one continuation row.
        assert_eq!(rendered.lines().count(), 12);
    }

    #[test]
    fn empty_matrix_renders_a_placeholder() {
        assert!(render(&[], 0, "test").contains("(empty matrix)"));
    }
}
