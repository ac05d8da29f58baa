#![no_std]

//! # DMNK
//!
//! A two-player m,n,k game (generalised tic-tac-toe) played for a stake.
//! Players take turns placing marks on an m×n board; some cells may be
//! gouged (permanently blocked). The first player to line up `k` marks
//! horizontally, vertically or diagonally wins the pot, minus the house fee.
//!
//! ## Game flow
//! 1. `new_game` validates the settings and gouged cells, and records the
//!    caller as initiator (status `Created`).
//! 2. The initiator `join`s, locking the bid in escrow (`Waiting`).
//! 3. A second address `join`s with the same bid (`Running`).
//! 4. Players alternate `append_move`, initiator first. The move that
//!    completes a run of `k` ends the game (`Completed`) and pays the
//!    winner; filling the last free cell without a run ends it as
//!    `Exhausted` and refunds both bids.
//! 5. Before the game runs, the initiator may `cancel_game` (`Aborted`)
//!    and gets the bid back.
//!
//! Alternatively, `play` posts a bid to a bounded FIFO queue and starts a
//! game with the default settings as soon as a compatible bid arrives. A
//! queued bid may name an operator address that signs the moves while the
//! funding address receives the payout.
//!
//! ## Escrow
//! Bids are held by this contract in a single SEP-41 token configured at
//! deploy time. A decided pot pays `pot - fee` to the winner and `fee`
//! (`fee_bps` of the pot, rounded down) to the house account.

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, log, Address, BytesN,
    Env, Vec,
};

mod board;
mod escrow;
mod game;
mod queue;
mod types;
mod win;

pub use board::Board;
pub use game::Game;
pub use queue::{QueuedBid, MAX_QUEUE_LEN};
pub use types::{Cell, GameSettings, GameStatus, Move, Players, MAX_BOARD_CELLS};

use game::MoveOutcome;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvGameCreated {
    pub initiator: Address,
    pub game: u32,
}

#[contractevent]
pub struct EvPlayerJoined {
    pub game: u32,
    pub player: Address,
    pub bid: i128,
}

#[contractevent]
pub struct EvMoveAppended {
    pub game: u32,
    pub player: Address,
    pub x: u32,
    pub y: u32,
    pub is_winner: bool,
}

#[contractevent]
pub struct EvGameCancelled {
    pub game: u32,
    pub initiator: Address,
}

/// Emitted once per game, when it reaches a terminal status.
#[contractevent]
pub struct EvGameFinished {
    pub game: u32,
    pub status: GameStatus,
    pub winner: Option<Address>,
}

#[contractevent]
pub struct EvPayoutReleased {
    pub game: u32,
    pub recipient: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvBidQueued {
    pub player: Address,
    pub operator: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvBidWithdrawn {
    pub player: Address,
    pub amount: i128,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum DmnkError {
    GameNotFound = 1,
    // Configuration
    InvalidBoardSize = 2,
    InvalidWinLength = 3,
    InvalidGougedCell = 4,
    BoardFullyGouged = 5,
    // Lifecycle
    InvalidStatus = 6,
    GameAlreadyEnded = 7,
    NotInitiator = 8,
    InitiatorMustJoinFirst = 9,
    SelfPlayNotAllowed = 10,
    // Moves
    NotAPlayer = 11,
    NotYourTurn = 12,
    OutOfBounds = 13,
    CellOccupied = 14,
    CellGouged = 15,
    // Bids
    BidMismatch = 16,
    InvalidBid = 17,
    InvalidBidRange = 18,
    AlreadyQueued = 19,
    BidNotQueued = 20,
    // Admin
    AdminNotSet = 21,
    TokenNotSet = 22,
    HouseNotSet = 23,
    InvalidFeeBps = 24,
    QueueFull = 25,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Storage keys
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Game(u32),
    GameCounter,
    Queue,
    Admin,
    Token,
    House,
    FeeBps,
    DefaultSettings,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// 10% of the pot on a decided game.
const DEFAULT_FEE_BPS: u32 = 1_000;
const MAX_FEE_BPS: u32 = 2_000;

// Queue matches use a 20×20 board with k=5 unless the admin changes it.
const DEFAULT_M: u32 = 20;
const DEFAULT_N: u32 = 20;
const DEFAULT_K: u32 = 5;

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// Games hold escrow, so they live in persistent storage for 30 days after
// their last write.
const GAME_TTL_SECONDS: u32 = 30 * 24 * 60 * 60;
const GAME_TTL_LEDGERS: u32 = GAME_TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct DmnkContract;

#[contractimpl]
impl DmnkContract {
    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Constructor
    // ───────────────────────────────────────────────────────────────────────────

    pub fn __constructor(env: Env, admin: Address, token: Address, house: Address) {
        let storage = env.storage().instance();
        storage.set(&StorageKey::Admin, &admin);
        storage.set(&StorageKey::Token, &token);
        storage.set(&StorageKey::House, &house);
        storage.set(&StorageKey::FeeBps, &DEFAULT_FEE_BPS);
        storage.set(
            &StorageKey::DefaultSettings,
            &GameSettings {
                m: DEFAULT_M,
                n: DEFAULT_N,
                k: DEFAULT_K,
            },
        );
        storage.set(&StorageKey::GameCounter, &0u32);
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Gateway
    // ───────────────────────────────────────────────────────────────────────────

    /// Create a game on an `m`×`n` board where `k` in a row wins.
    ///
    /// The initiator is seated in the first slot but still has to `join`
    /// to lock a bid. Nothing is stored if the settings or the gouged
    /// cells are invalid.
    pub fn new_game(
        env: Env,
        initiator: Address,
        m: u32,
        n: u32,
        k: u32,
        gouged: Vec<Cell>,
    ) -> Result<u32, DmnkError> {
        initiator.require_auth();

        let settings = GameSettings { m, n, k };
        let game = Game::new(&env, initiator.clone(), settings, &gouged)?;
        let game_id = Self::next_game_id(&env);

        EvGameCreated {
            initiator,
            game: game_id,
        }
        .publish(&env);

        Self::write_game(&env, game_id, &game);
        Ok(game_id)
    }

    /// Whether `game_id` was created by this contract.
    pub fn verify_game(env: Env, game_id: u32) -> bool {
        env.storage().persistent().has(&StorageKey::Game(game_id))
    }

    pub fn game_count(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&StorageKey::GameCounter)
            .unwrap_or(0)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Game lifecycle
    // ───────────────────────────────────────────────────────────────────────────

    /// Take a seat and lock `bid` in escrow. Returns the resulting status.
    ///
    /// The initiator joins first and sets the bid; the second player must
    /// match it exactly.
    pub fn join(env: Env, game_id: u32, player: Address, bid: i128) -> Result<GameStatus, DmnkError> {
        player.require_auth();

        let token = Self::load_token(&env)?;
        let mut game = Self::read_game(&env, game_id)?;
        game.join(&player, bid)?;

        escrow::lock(&env, &token, &player, bid);

        EvPlayerJoined {
            game: game_id,
            player,
            bid,
        }
        .publish(&env);

        Self::write_game(&env, game_id, &game);
        Ok(game.status)
    }

    /// Abort a game that is not running yet and refund the initiator.
    pub fn cancel_game(env: Env, game_id: u32, caller: Address) -> Result<(), DmnkError> {
        caller.require_auth();

        let mut game = Self::read_game(&env, game_id)?;
        game.cancel(&caller)?;

        EvGameCancelled {
            game: game_id,
            initiator: caller,
        }
        .publish(&env);

        Self::settle(&env, game_id, &mut game)?;
        Self::write_game(&env, game_id, &game);
        Ok(())
    }

    /// Place a mark for `player` at `(x, y)`. Returns `true` if the move won
    /// the game.
    pub fn append_move(env: Env, game_id: u32, player: Address, x: u32, y: u32) -> Result<bool, DmnkError> {
        player.require_auth();

        let mut game = Self::read_game(&env, game_id)?;
        let outcome = game.append_move(&player, x, y)?;
        let is_winner = outcome == MoveOutcome::Won;

        EvMoveAppended {
            game: game_id,
            player,
            x,
            y,
            is_winner,
        }
        .publish(&env);

        if outcome != MoveOutcome::Continue {
            Self::settle(&env, game_id, &mut game)?;
        }

        Self::write_game(&env, game_id, &game);
        Ok(is_winner)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Queue matchmaking
    // ───────────────────────────────────────────────────────────────────────────

    /// Deposit `amount` from `player` and wait for an opponent whose bid
    /// fits `[min_bid, max_bid]` (and whose range fits `amount`).
    ///
    /// `operator` signs this side's moves in the resulting game; payouts
    /// and refunds always go to `player`. Pass `player` again to sign
    /// moves with the funding address.
    ///
    /// Pairs with the oldest compatible queued bid. On a match the game is
    /// created with the default settings and starts `Running` straight
    /// away, the earlier player moving first; both stakes equal the smaller
    /// of the two amounts and any excess is refunded. Returns the new game
    /// id, or `None` if the bid was queued. A bid that would have to wait
    /// while `MAX_QUEUE_LEN` bids are pending fails with `QueueFull`.
    pub fn play(
        env: Env,
        player: Address,
        operator: Address,
        amount: i128,
        min_bid: i128,
        max_bid: i128,
    ) -> Result<Option<u32>, DmnkError> {
        player.require_auth();
        queue::validate_bid(amount, min_bid, max_bid)?;

        let token = Self::load_token(&env)?;
        let mut pending = Self::load_queue(&env);
        if queue::position_of(&pending, &player).is_some() {
            return Err(DmnkError::AlreadyQueued);
        }

        let bid = QueuedBid {
            player: player.clone(),
            operator: operator.clone(),
            amount,
            min_bid,
            max_bid,
        };

        let Some(idx) = queue::find_match(&pending, &bid) else {
            if pending.len() >= MAX_QUEUE_LEN {
                return Err(DmnkError::QueueFull);
            }
            escrow::lock(&env, &token, &player, amount);
            pending.push_back(bid);
            Self::store_queue(&env, &pending);
            EvBidQueued {
                player,
                operator,
                amount,
            }
            .publish(&env);
            return Ok(None);
        };

        escrow::lock(&env, &token, &player, amount);

        let earlier = pending.get(idx).ok_or(DmnkError::BidNotQueued)?;
        pending.remove(idx);

        let stake = earlier.amount.min(amount);
        let settings = Self::get_default_settings(env.clone());
        let mut game = Game::new(&env, earlier.player.clone(), settings, &Vec::new(&env))?;
        game.join_with_operator(&earlier.player, &earlier.operator, stake)?;
        game.join_with_operator(&player, &operator, stake)?;

        escrow::release(&env, &token, &earlier.player, earlier.amount - stake);
        escrow::release(&env, &token, &player, amount - stake);

        let game_id = Self::next_game_id(&env);
        EvGameCreated {
            initiator: earlier.player.clone(),
            game: game_id,
        }
        .publish(&env);
        EvPlayerJoined {
            game: game_id,
            player: earlier.player,
            bid: stake,
        }
        .publish(&env);
        EvPlayerJoined {
            game: game_id,
            player,
            bid: stake,
        }
        .publish(&env);

        Self::store_queue(&env, &pending);
        Self::write_game(&env, game_id, &game);
        Ok(Some(game_id))
    }

    /// Leave the queue and get the deposit back.
    pub fn withdraw_bid(env: Env, player: Address) -> Result<i128, DmnkError> {
        player.require_auth();

        let token = Self::load_token(&env)?;
        let mut pending = Self::load_queue(&env);
        let idx = queue::position_of(&pending, &player).ok_or(DmnkError::BidNotQueued)?;
        let bid = pending.get(idx).ok_or(DmnkError::BidNotQueued)?;
        pending.remove(idx);

        escrow::release(&env, &token, &player, bid.amount);
        EvBidWithdrawn {
            player,
            amount: bid.amount,
        }
        .publish(&env);

        Self::store_queue(&env, &pending);
        Ok(bid.amount)
    }

    pub fn get_queue(env: Env) -> Vec<QueuedBid> {
        Self::load_queue(&env)
    }

    pub fn get_queue_length(env: Env) -> u32 {
        Self::load_queue(&env).len()
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Read
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_game(env: Env, game_id: u32) -> Result<Game, DmnkError> {
        Self::read_game(&env, game_id)
    }

    pub fn get_game_status(env: Env, game_id: u32) -> Result<GameStatus, DmnkError> {
        Ok(Self::read_game(&env, game_id)?.status)
    }

    pub fn get_players(env: Env, game_id: u32) -> Result<Players, DmnkError> {
        Ok(Self::read_game(&env, game_id)?.players())
    }

    /// The operator whose turn it is. Before the game runs this is the
    /// initiator's, since the initiator always moves first.
    pub fn get_current_player(env: Env, game_id: u32) -> Result<Address, DmnkError> {
        Ok(Self::read_game(&env, game_id)?.current_player())
    }

    pub fn get_winner(env: Env, game_id: u32) -> Result<Option<Address>, DmnkError> {
        Ok(Self::read_game(&env, game_id)?.winner)
    }

    pub fn get_move_count(env: Env, game_id: u32) -> Result<u32, DmnkError> {
        Ok(Self::read_game(&env, game_id)?.moves.len())
    }

    pub fn get_moves(env: Env, game_id: u32) -> Result<Vec<Move>, DmnkError> {
        Ok(Self::read_game(&env, game_id)?.moves)
    }

    pub fn get_settings(env: Env, game_id: u32) -> Result<GameSettings, DmnkError> {
        Ok(Self::read_game(&env, game_id)?.settings)
    }

    pub fn get_bid(env: Env, game_id: u32) -> Result<i128, DmnkError> {
        Ok(Self::read_game(&env, game_id)?.bid)
    }

    /// Escrow currently held for the game: `bid × joined players` until it
    /// ends, zero afterwards.
    pub fn get_locked_value(env: Env, game_id: u32) -> Result<i128, DmnkError> {
        Ok(Self::read_game(&env, game_id)?.locked)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Admin
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_admin(env: Env) -> Result<Address, DmnkError> {
        Self::load_admin(&env)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), DmnkError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage().instance().set(&StorageKey::Admin, &new_admin);
        Ok(())
    }

    pub fn get_token(env: Env) -> Result<Address, DmnkError> {
        Self::load_token(&env)
    }

    pub fn get_house(env: Env) -> Result<Address, DmnkError> {
        Self::load_house(&env)
    }

    pub fn set_house(env: Env, new_house: Address) -> Result<(), DmnkError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage().instance().set(&StorageKey::House, &new_house);
        Ok(())
    }

    pub fn get_fee_bps(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&StorageKey::FeeBps)
            .unwrap_or(DEFAULT_FEE_BPS)
    }

    /// Applies to games settled after the change, including running ones.
    pub fn set_fee_bps(env: Env, fee_bps: u32) -> Result<(), DmnkError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        if fee_bps > MAX_FEE_BPS {
            return Err(DmnkError::InvalidFeeBps);
        }
        env.storage().instance().set(&StorageKey::FeeBps, &fee_bps);
        Ok(())
    }

    pub fn get_default_settings(env: Env) -> GameSettings {
        env.storage()
            .instance()
            .get(&StorageKey::DefaultSettings)
            .unwrap_or(GameSettings {
                m: DEFAULT_M,
                n: DEFAULT_N,
                k: DEFAULT_K,
            })
    }

    /// Board used for games created by `play`.
    pub fn set_default_settings(env: Env, m: u32, n: u32, k: u32) -> Result<(), DmnkError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        let settings = GameSettings { m, n, k };
        settings.validate()?;
        env.storage()
            .instance()
            .set(&StorageKey::DefaultSettings, &settings);
        Ok(())
    }

    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), DmnkError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.deployer().update_current_contract_wasm(new_wasm_hash);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Settlement (single payout call-site)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Release the escrow of a game that just reached a terminal status.
    ///
    /// `Completed` pays the winner `pot - fee` and the house `fee`.
    /// `Aborted` and `Exhausted` return each joined player's bid in full.
    fn settle(env: &Env, game_id: u32, game: &mut Game) -> Result<(), DmnkError> {
        let token = Self::load_token(env)?;

        match game.status {
            GameStatus::Completed => {
                let winner = game.winner.clone().ok_or(DmnkError::InvalidStatus)?;
                let house = Self::load_house(env)?;
                let fee_bps = Self::get_fee_bps(env.clone());
                let (prize, fee) = escrow::split_pot(game.locked, fee_bps);
                Self::pay_out(env, &token, game_id, &winner, prize);
                Self::pay_out(env, &token, game_id, &house, fee);
            }
            GameStatus::Aborted | GameStatus::Exhausted => {
                for player in game.joined_players(env).iter() {
                    Self::pay_out(env, &token, game_id, &player, game.bid);
                }
            }
            _ => return Err(DmnkError::InvalidStatus),
        }
        game.locked = 0;

        log!(env, "game settled", game_id, game.status as u32);

        EvGameFinished {
            game: game_id,
            status: game.status,
            winner: game.winner.clone(),
        }
        .publish(env);
        Ok(())
    }

    fn pay_out(env: &Env, token: &Address, game_id: u32, recipient: &Address, amount: i128) {
        if amount <= 0 {
            return;
        }
        escrow::release(env, token, recipient, amount);
        EvPayoutReleased {
            game: game_id,
            recipient: recipient.clone(),
            amount,
        }
        .publish(env);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Storage
    // ═══════════════════════════════════════════════════════════════════════════

    fn next_game_id(env: &Env) -> u32 {
        let id = Self::game_count(env.clone()).saturating_add(1);
        env.storage().instance().set(&StorageKey::GameCounter, &id);
        id
    }

    fn read_game(env: &Env, game_id: u32) -> Result<Game, DmnkError> {
        env.storage()
            .persistent()
            .get(&StorageKey::Game(game_id))
            .ok_or(DmnkError::GameNotFound)
    }

    fn write_game(env: &Env, game_id: u32, game: &Game) {
        let key = StorageKey::Game(game_id);
        env.storage().persistent().set(&key, game);
        env.storage()
            .persistent()
            .extend_ttl(&key, GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
        // Keep instance storage (admin, token, settings) alive
        env.storage()
            .instance()
            .extend_ttl(GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
    }

    fn load_queue(env: &Env) -> Vec<QueuedBid> {
        env.storage()
            .persistent()
            .get(&StorageKey::Queue)
            .unwrap_or_else(|| Vec::new(env))
    }

    // Queued bids hold deposits, so they get the same TTL as games.
    fn store_queue(env: &Env, pending: &Vec<QueuedBid>) {
        env.storage().persistent().set(&StorageKey::Queue, pending);
        env.storage()
            .persistent()
            .extend_ttl(&StorageKey::Queue, GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
        env.storage()
            .instance()
            .extend_ttl(GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
    }

    fn load_admin(env: &Env) -> Result<Address, DmnkError> {
        env.storage()
            .instance()
            .get(&StorageKey::Admin)
            .ok_or(DmnkError::AdminNotSet)
    }

    fn load_token(env: &Env) -> Result<Address, DmnkError> {
        env.storage()
            .instance()
            .get(&StorageKey::Token)
            .ok_or(DmnkError::TokenNotSet)
    }

    fn load_house(env: &Env) -> Result<Address, DmnkError> {
        env.storage()
            .instance()
            .get(&StorageKey::House)
            .ok_or(DmnkError::HouseNotSet)
    }
}
