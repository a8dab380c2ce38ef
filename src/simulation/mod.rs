pub mod random_round;
