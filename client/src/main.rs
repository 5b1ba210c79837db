use std::env;

use tracing::warn;

use rowmax_client::matrix;
use rowmax_wire::{DEFAULT_PORT, MAX_MATRIX_SIZE};

const DEFAULT_MATRIX_SIZE: u32 = 5;
const DEFAULT_NUM_THREADS: u32 = 2;
const MAX_NUM_THREADS: u32 = 128;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let mut size: u32 = args
        .get(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(DEFAULT_MATRIX_SIZE);
    let mut threads: u32 = args
        .get(2)
        .and_then(|a| a.parse().ok())
        .unwrap_or(DEFAULT_NUM_THREADS);

    if size == 0 || size > MAX_MATRIX_SIZE {
        warn!(size, "matrix size out of range, using default {}", DEFAULT_MATRIX_SIZE);
        size = DEFAULT_MATRIX_SIZE;
    }
    if threads == 0 || threads > MAX_NUM_THREADS {
        warn!(threads, "thread count out of range, using default {}", DEFAULT_NUM_THREADS);
        threads = DEFAULT_NUM_THREADS;
    }

    let input = matrix::random(size);
    println!("{}", matrix::render(&input, size, "original matrix"));

    let addr = format!("127.0.0.1:{DEFAULT_PORT}");
    let result = rowmax_client::run(&addr, &input, size, threads).await?;
    println!("{}", matrix::render(&result, size, "result matrix"));

    Ok(())
}
