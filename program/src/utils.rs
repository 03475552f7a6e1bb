// Raffle program utility functions

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Index of the winning entry: the random word modulo the entry count
pub fn winner_index(random_word: u64, num_players: usize) -> usize {
    assert!(num_players > 0, "winner selection over an empty round");
    (random_word % num_players as u64) as usize
}

/// Lamports held above the rent-exempt reserve
pub fn custody_balance(lamports: u64, rent_minimum: u64) -> u64 {
    lamports.saturating_sub(rent_minimum)
}

/// Convert lamports to SOL (for display purposes)
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
