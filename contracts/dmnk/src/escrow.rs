//! Token escrow held by the contract address.
//!
//! Every game's share of the pooled balance is tracked in `Game::locked`;
//! these helpers only move tokens in and out of the contract.

use soroban_sdk::{token, Address, Env};

pub const BPS_DENOMINATOR: i128 = 10_000;

/// Split a decided pot into `(winner_share, house_fee)`. The fee rounds down.
pub fn split_pot(pot: i128, fee_bps: u32) -> (i128, i128) {
    let fee = pot.saturating_mul(fee_bps as i128) / BPS_DENOMINATOR;
    (pot - fee, fee)
}

/// Pull `amount` from `from` into the contract. Zero is a no-op.
pub fn lock(env: &Env, token: &Address, from: &Address, amount: i128) {
    if amount > 0 {
        token::Client::new(env, token).transfer(from, &env.current_contract_address(), &amount);
    }
}

/// Pay `amount` out of the contract to `to`. Zero is a no-op.
pub fn release(env: &Env, token: &Address, to: &Address, amount: i128) {
    if amount > 0 {
        token::Client::new(env, token).transfer(&env.current_contract_address(), to, &amount);
    }
}
