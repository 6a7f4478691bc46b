use anchor_lang::prelude::*;

use crate::ErrorCode;

/// Most plays a single history account holds. Indices are never reused.
pub const MAX_PLAYS: usize = 48;
/// Most addresses the leaderboard registry tracks.
pub const MAX_PLAYERS: usize = 256;
/// Ciphertexts in one spin outcome: bet, three reels, payout.
pub const OUTCOME_CIPHERTEXTS: usize = 5;

#[account]
pub struct Treasury {
    pub authority: Pubkey,
    pub max_bet: u64,
    pub total_spins: u64,
    /// Lamports players have deposited and not yet withdrawn or been refunded.
    pub player_deposits: u64,
    pub bump: u8,
}

impl Treasury {
    pub const SPACE: usize = 8 + 32 + 8 + 8 + 8 + 1;

    pub fn credit_deposit(&mut self, amount: u64) -> Result<()> {
        self.player_deposits = self
            .player_deposits
            .checked_add(amount)
            .ok_or(ErrorCode::Overflow)?;
        Ok(())
    }

    /// Withdrawals may include winnings, so this never goes below zero.
    pub fn debit_player_funds(&mut self, amount: u64) {
        self.player_deposits = self.player_deposits.saturating_sub(amount);
    }

    /// Part of `free_lamports` that belongs to the house rather than to depositors.
    pub fn house_lamports(&self, free_lamports: u64) -> u64 {
        free_lamports.saturating_sub(self.player_deposits)
    }
}

#[account]
pub struct PlayerAccount {
    pub owner: Pubkey,
    /// Encrypted balance, owned by the MXE cluster.
    pub balance_ciphertext: [u8; 32],
    pub balance_nonce: u128,
    pub status: u8,
    pub pending_kind: u8,
    /// Lamports held in the treasury on behalf of an in-flight deposit.
    pub pending_amount: u64,
    pub pending_since: i64,
    /// Computation account of the in-flight computation.
    pub pending_computation: Pubkey,
    pub bump: u8,
}

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PlayerStatus {
    Unregistered = 0,
    Idle = 1,
    Pending = 2,
}

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PendingKind {
    None = 0,
    Register = 1,
    Deposit = 2,
    Spin = 3,
    Withdraw = 4,
}

impl PlayerAccount {
    // discriminator + owner + ciphertext + nonce + status + kind + amount + since + computation + bump
    pub const SPACE: usize = 8 + 32 + 32 + 16 + 1 + 1 + 8 + 8 + 32 + 1;

    /// Byte offset of `balance_ciphertext`, read directly by the cluster.
    pub const BALANCE_OFFSET: u32 = 8 + 32;

    pub fn is(&self, status: PlayerStatus) -> bool {
        self.status == status as u8
    }

    pub fn begin(
        &mut self,
        kind: PendingKind,
        amount: u64,
        computation: Pubkey,
        now: i64,
    ) -> Result<()> {
        match kind {
            PendingKind::Register => {
                require!(self.is(PlayerStatus::Unregistered), ErrorCode::AlreadyRegistered)
            }
            _ => {
                require!(!self.is(PlayerStatus::Unregistered), ErrorCode::NotRegistered);
                require!(self.is(PlayerStatus::Idle), ErrorCode::ComputationPending);
            }
        }
        self.status = PlayerStatus::Pending as u8;
        self.pending_kind = kind as u8;
        self.pending_amount = amount;
        self.pending_since = now;
        self.pending_computation = computation;
        Ok(())
    }

    /// Checks that a callback belongs to the computation this player is waiting on.
    pub fn expect_pending(&self, kind: PendingKind, computation: &Pubkey) -> Result<()> {
        require!(
            self.is(PlayerStatus::Pending) && self.pending_kind == kind as u8,
            ErrorCode::NotPending
        );
        require_keys_eq!(
            self.pending_computation,
            *computation,
            ErrorCode::ComputationMismatch
        );
        Ok(())
    }

    pub fn store_balance(&mut self, ciphertext: [u8; 32], nonce: u128) {
        self.balance_ciphertext = ciphertext;
        self.balance_nonce = nonce;
    }

    pub fn finish(&mut self) {
        self.status = PlayerStatus::Idle as u8;
        self.clear_pending();
    }

    /// Drops the in-flight computation. Returns the kind that was pending.
    pub fn cancel(&mut self, caller: &Pubkey, now: i64, timeout_secs: i64) -> Result<PendingKind> {
        require_keys_eq!(self.owner, *caller, ErrorCode::NotAccountOwner);
        require!(self.is(PlayerStatus::Pending), ErrorCode::NotPending);
        require!(now - self.pending_since > timeout_secs, ErrorCode::NotTimedOut);

        let kind = match self.pending_kind {
            1 => PendingKind::Register,
            2 => PendingKind::Deposit,
            3 => PendingKind::Spin,
            4 => PendingKind::Withdraw,
            _ => PendingKind::None,
        };
        self.status = if kind == PendingKind::Register {
            PlayerStatus::Unregistered as u8
        } else {
            PlayerStatus::Idle as u8
        };
        self.clear_pending();
        Ok(kind)
    }

    fn clear_pending(&mut self) {
        self.pending_kind = PendingKind::None as u8;
        self.pending_amount = 0;
        self.pending_since = 0;
        self.pending_computation = Pubkey::default();
    }
}

/// One spin, as stored on chain. Only the player can decrypt `outcome`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct PlayRecord {
    /// bet, reel 1, reel 2, reel 3, payout
    pub outcome: [[u8; 32]; OUTCOME_CIPHERTEXTS],
    pub nonce: u128,
    pub timestamp: i64,
    pub claimed: bool,
}

impl PlayRecord {
    pub const SPACE: usize = 32 * OUTCOME_CIPHERTEXTS + 16 + 8 + 1;

    pub fn new(outcome: [[u8; 32]; OUTCOME_CIPHERTEXTS], nonce: u128, timestamp: i64) -> Self {
        Self {
            outcome,
            nonce,
            timestamp,
            claimed: false,
        }
    }
}

#[account]
pub struct PlayHistory {
    pub owner: Pubkey,
    pub bump: u8,
    pub records: Vec<PlayRecord>,
}

impl PlayHistory {
    pub const SPACE: usize = 8 + 32 + 1 + 4 + MAX_PLAYS * PlayRecord::SPACE;

    pub fn is_full(&self) -> bool {
        self.records.len() >= MAX_PLAYS
    }

    /// Appends a record and returns its index.
    pub fn append(&mut self, record: PlayRecord) -> Result<u32> {
        require!(!self.is_full(), ErrorCode::HistoryFull);
        self.records.push(record);
        Ok((self.records.len() - 1) as u32)
    }

    pub fn get(&self, index: u32) -> Result<&PlayRecord> {
        self.records
            .get(index as usize)
            .ok_or_else(|| error!(ErrorCode::PlayNotFound))
    }

    pub fn claim(&mut self, index: u32) -> Result<&PlayRecord> {
        let record = self
            .records
            .get_mut(index as usize)
            .ok_or_else(|| error!(ErrorCode::PlayNotFound))?;
        require!(!record.claimed, ErrorCode::AlreadyClaimed);
        record.claimed = true;
        Ok(record)
    }
}

#[account]
pub struct PlayerRegistry {
    pub bump: u8,
    pub players: Vec<Pubkey>,
}

impl PlayerRegistry {
    pub const SPACE: usize = 8 + 1 + 4 + MAX_PLAYERS * 32;

    /// Adds `player` once. Returns false when it was already listed.
    pub fn register(&mut self, player: Pubkey) -> Result<bool> {
        if self.players.contains(&player) {
            return Ok(false);
        }
        require!(self.players.len() < MAX_PLAYERS, ErrorCode::RegistryFull);
        self.players.push(player);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    fn record(tag: u8) -> PlayRecord {
        PlayRecord::new([[tag; 32]; OUTCOME_CIPHERTEXTS], tag as u128, 1_700_000_000)
    }

    fn history() -> PlayHistory {
        PlayHistory {
            owner: Pubkey::new_unique(),
            bump: 255,
            records: Vec::new(),
        }
    }

    fn player() -> PlayerAccount {
        PlayerAccount {
            owner: Pubkey::new_unique(),
            balance_ciphertext: [0; 32],
            balance_nonce: 0,
            status: PlayerStatus::Unregistered as u8,
            pending_kind: PendingKind::None as u8,
            pending_amount: 0,
            pending_since: 0,
            pending_computation: Pubkey::default(),
            bump: 254,
        }
    }

    #[test]
    fn history_indices_are_stable() {
        let mut h = history();
        assert_eq!(h.append(record(1)).unwrap(), 0);
        assert_eq!(h.append(record(2)).unwrap(), 1);
        h.claim(0).unwrap();
        assert_eq!(h.append(record(3)).unwrap(), 2);
        assert_eq!(h.get(1).unwrap().nonce, 2);
        assert!(h.get(0).unwrap().claimed);
        assert!(!h.get(2).unwrap().claimed);
    }

    #[test]
    fn history_rejects_overflow() {
        let mut h = history();
        for i in 0..MAX_PLAYS {
            h.append(record(i as u8)).unwrap();
        }
        assert!(h.is_full());
        assert_eq!(
            h.append(record(0)).unwrap_err(),
            Error::from(ErrorCode::HistoryFull)
        );
    }

    #[test]
    fn claim_is_one_way() {
        let mut h = history();
        h.append(record(7)).unwrap();
        assert!(h.claim(0).unwrap().claimed);
        assert_eq!(
            h.claim(0).unwrap_err(),
            Error::from(ErrorCode::AlreadyClaimed)
        );
        assert!(h.get(0).unwrap().claimed);
        assert_eq!(h.claim(1).unwrap_err(), Error::from(ErrorCode::PlayNotFound));
    }

    #[test]
    fn registry_dedups_and_caps() {
        let mut r = PlayerRegistry {
            bump: 1,
            players: Vec::new(),
        };
        let first = Pubkey::new_unique();
        assert!(r.register(first).unwrap());
        assert!(!r.register(first).unwrap());
        for _ in 1..MAX_PLAYERS {
            r.register(Pubkey::new_unique()).unwrap();
        }
        assert_eq!(r.players.len(), MAX_PLAYERS);
        assert!(!r.register(first).unwrap());
        assert_eq!(
            r.register(Pubkey::new_unique()).unwrap_err(),
            Error::from(ErrorCode::RegistryFull)
        );
    }

    #[test]
    fn player_lifecycle() {
        let mut p = player();
        let comp = Pubkey::new_unique();

        assert_eq!(
            p.begin(PendingKind::Spin, 0, comp, 10).unwrap_err(),
            Error::from(ErrorCode::NotRegistered)
        );
        p.begin(PendingKind::Register, 0, comp, 10).unwrap();
        assert_eq!(
            p.expect_pending(PendingKind::Register, &Pubkey::new_unique())
                .unwrap_err(),
            Error::from(ErrorCode::ComputationMismatch)
        );
        p.expect_pending(PendingKind::Register, &comp).unwrap();
        p.store_balance([9; 32], 42);
        p.finish();
        assert!(p.is(PlayerStatus::Idle));

        p.begin(PendingKind::Deposit, 500, comp, 20).unwrap();
        assert_eq!(
            p.begin(PendingKind::Spin, 0, comp, 21).unwrap_err(),
            Error::from(ErrorCode::ComputationPending)
        );
        assert_eq!(
            p.expect_pending(PendingKind::Spin, &comp).unwrap_err(),
            Error::from(ErrorCode::NotPending)
        );
        assert_eq!(p.balance_nonce, 42);
    }

    #[test]
    fn cancel_waits_for_timeout() {
        let mut p = player();
        let comp = Pubkey::new_unique();
        let owner = p.owner;
        p.begin(PendingKind::Register, 0, comp, 100).unwrap();
        assert_eq!(
            p.cancel(&owner, 150, 60).unwrap_err(),
            Error::from(ErrorCode::NotTimedOut)
        );
        assert_eq!(p.cancel(&owner, 161, 60).unwrap(), PendingKind::Register);
        assert!(p.is(PlayerStatus::Unregistered));

        p.begin(PendingKind::Register, 0, comp, 200).unwrap();
        p.finish();
        p.begin(PendingKind::Deposit, 1_000, comp, 300).unwrap();
        assert_eq!(p.cancel(&owner, 400, 60).unwrap(), PendingKind::Deposit);
        assert!(p.is(PlayerStatus::Idle));
        assert_eq!(p.pending_amount, 0);
        assert_eq!(
            p.cancel(&owner, 500, 60).unwrap_err(),
            Error::from(ErrorCode::NotPending)
        );
    }

    #[test]
    fn only_owner_cancels() {
        let mut p = player();
        let owner = p.owner;
        p.begin(PendingKind::Register, 0, Pubkey::new_unique(), 0).unwrap();
        p.finish();
        p.begin(PendingKind::Spin, 0, Pubkey::new_unique(), 0).unwrap();
        assert_eq!(
            p.cancel(&Pubkey::new_unique(), 1_000, 60).unwrap_err(),
            Error::from(ErrorCode::NotAccountOwner)
        );
        assert!(p.is(PlayerStatus::Pending));
        assert_eq!(p.cancel(&owner, 1_000, 60).unwrap(), PendingKind::Spin);
    }

    #[test]
    fn deposits_are_not_bankroll() {
        let mut t = Treasury {
            authority: Pubkey::new_unique(),
            max_bet: 1_000_000,
            total_spins: 0,
            player_deposits: 0,
            bump: 253,
        };
        let exposure = crate::paytable::max_exposure(t.max_bet).unwrap();

        // Unfunded house: player deposits alone must not cover a spin.
        t.credit_deposit(exposure).unwrap();
        assert_eq!(t.house_lamports(exposure), 0);

        // House funds arrive on top of the deposits.
        assert_eq!(t.house_lamports(exposure * 2), exposure);

        // Withdrawing winnings beyond the deposits saturates.
        t.debit_player_funds(exposure + 5);
        assert_eq!(t.player_deposits, 0);
        assert_eq!(t.house_lamports(10), 10);

        t.player_deposits = u64::MAX;
        assert_eq!(t.credit_deposit(1).unwrap_err(), Error::from(ErrorCode::Overflow));
    }

    #[test]
    fn account_sizes() {
        assert_eq!(PlayRecord::SPACE, 185);
        assert!(PlayHistory::SPACE <= 10_240);
        assert!(PlayerRegistry::SPACE <= 10_240);
        assert_eq!(PlayerAccount::SPACE, 139);
    }
}
