//! Chunked row-max transform over scoped worker threads.

use std::thread;

use crate::error::Error;

/// Splits `rows` into at most `tasks` contiguous chunk lengths.
///
/// With `q = rows / tasks` and `r = rows % tasks`, the first `r` chunks carry
/// `q + 1` rows and the rest carry `q`; chunks that would be empty are
/// omitted, so the returned length is `min(tasks, rows)`.
pub fn row_chunks(rows: u32, tasks: u32) -> Vec<u32> {
    if rows == 0 {
        return Vec::new();
    }
    let tasks = tasks.max(1);
    let base = rows / tasks;
    let extra = rows % tasks;
    (0..tasks)
        .map(|i| if i < extra { base + 1 } else { base })
        .filter(|&len| len > 0)
        .collect()
}

/// Applies the row-max transform to a `size` × `size` row-major matrix in
/// place, fanning the row chunks out to at most `tasks` parallel threads.
///
/// Each thread owns a disjoint sub-slice of whole rows, so the fan-out needs
/// no synchronization. A panicked row task is reported as
/// [`Error::TaskPanicked`]; the buffer contents are then unspecified.
pub fn apply(matrix: &mut [f32], size: u32, tasks: u32) -> Result<(), Error> {
    let elements = size as usize * size as usize;
    if matrix.len() != elements {
        return Err(Error::DimensionMismatch {
            elements: matrix.len(),
            size,
        });
    }

    let side = size as usize;
    let chunks = row_chunks(size, tasks);
    let mut panicked = 0usize;

    let mut rest = matrix;
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(chunks.len());
        let mut first_row = 0usize;
        for &len in &chunks {
            let rows = len as usize;
            let tail = std::mem::take(&mut rest);
            let (chunk, tail) = tail.split_at_mut(rows * side);
            rest = tail;
            handles.push(scope.spawn(move || transform_rows(chunk, side, first_row)));
            first_row += rows;
        }
        for handle in handles {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
    });

    if panicked > 0 {
        return Err(Error::TaskPanicked(panicked));
    }
    Ok(())
}

fn transform_rows(rows: &mut [f32], side: usize, first_row: usize) {
    for (offset, row) in rows.chunks_mut(side).enumerate() {
        let index = first_row + offset;
        let mut max = f32::NEG_INFINITY;
        for &value in row.iter() {
            if value > max {
                max = value;
            }
        }
        if index < side {
            row[index] = max;
        }
    }
}
