//! End-to-end driver tests against an in-process server.

use std::net::SocketAddr;

use rowmax_client::matrix;
use rowmax_server::listener;

async fn start_test_server() -> SocketAddr {
    let listener = listener::bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = listener::serve(listener).await;
    });
    addr
}

#[tokio::test]
async fn end_to_end_row_max() {
    let addr = start_test_server().await;

    let size = 8u32;
    let side = size as usize;
    let input = matrix::random(size);
    let result = rowmax_client::run(&addr.to_string(), &input, size, 3)
        .await
        .unwrap();

    assert_eq!(result.len(), side * side);
    for i in 0..side {
        let row_max = input[i * side..(i + 1) * side]
            .iter()
            .fold(f32::NEG_INFINITY, |m, &v| if v > m { v } else { m });
        for j in 0..side {
            let expected = if i == j { row_max } else { input[i * side + j] };
            assert_eq!(result[i * side + j], expected, "cell ({i},{j})");
        }
    }
}

#[tokio::test]
async fn single_element_round_trip() {
    let addr = start_test_server().await;

    let result = rowmax_client::run(&addr.to_string(), &[7.0], 1, 1)
        .await
        .unwrap();
    assert_eq!(result, vec![7.0]);
}
