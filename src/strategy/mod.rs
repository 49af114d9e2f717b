pub mod oversold_bounce;
