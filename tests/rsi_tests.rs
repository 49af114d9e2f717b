use dip_sniper::indicator::rsi::{rsi_series, RSI_PERIOD};

fn closes_from_deltas(start: f64, deltas: &[f64]) -> Vec<f64> {
    let mut out = vec![start];
    for d in deltas {
        let last = *out.last().unwrap();
        out.push(last + d);
    }
    out
}

#[test]
fn rising_series_reads_exactly_100() {
    let closes: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
    let rsi = rsi_series(&closes, RSI_PERIOD);
    for v in rsi.iter().flatten() {
        assert_eq!(*v, 100.0);
    }
}

#[test]
fn flat_series_reads_100() {
    let closes = vec![42.0; 25];
    let rsi = rsi_series(&closes, RSI_PERIOD);
    assert_eq!(rsi[24], Some(100.0));
}

#[test]
fn falling_series_reads_zero() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
    let rsi = rsi_series(&closes, RSI_PERIOD);
    assert_eq!(rsi[29], Some(0.0));
}

#[test]
fn alternating_moves_read_50() {
    let closes: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
    let rsi = rsi_series(&closes, RSI_PERIOD);
    for v in rsi.iter().flatten() {
        assert!((v - 50.0).abs() < 1e-9);
    }
}

#[test]
fn simple_average_of_gains_and_losses() {
    // Ten +2 moves and four -1 moves: avg gain 20/14, avg loss 4/14, RS = 5.
    let mut deltas = vec![2.0; 10];
    deltas.extend([-1.0; 4]);
    let closes = closes_from_deltas(100.0, &deltas);
    let rsi = rsi_series(&closes, RSI_PERIOD);
    let expected = 100.0 - 100.0 / 6.0;
    assert!((rsi[14].unwrap() - expected).abs() < 1e-9);
}

#[test]
fn value_depends_only_on_trailing_window() {
    let tail = [1.0, -0.5, 2.0, -3.0, 0.25, 1.5, -1.0, 0.75, -0.25, 2.5, -2.0, 1.0, 0.5, -1.5, 0.8];
    let mut a_deltas = vec![5.0, -7.0, 3.0, 4.0, -9.0];
    a_deltas.extend(tail);
    let mut b_deltas = vec![-1.0; 12];
    b_deltas.extend(tail);

    let a = rsi_series(&closes_from_deltas(200.0, &a_deltas), RSI_PERIOD);
    let b = rsi_series(&closes_from_deltas(80.0, &b_deltas), RSI_PERIOD);
    let (la, lb) = (a.last().unwrap().unwrap(), b.last().unwrap().unwrap());
    assert!((la - lb).abs() < 1e-9, "a={} b={}", la, lb);
}

#[test]
fn first_period_values_are_undefined() {
    let closes: Vec<f64> = (0..16).map(|i| (i as f64).sin() + 10.0).collect();
    let rsi = rsi_series(&closes, RSI_PERIOD);
    assert!(rsi[..14].iter().all(Option::is_none));
    assert!(rsi[14].is_some());
    assert!(rsi[15].is_some());
}
