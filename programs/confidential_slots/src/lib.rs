use anchor_lang::prelude::*;
use anchor_lang::system_program;
use arcium_anchor::prelude::*;
use arcium_anchor::LUT_PROGRAM_ID;
use arcium_client::idl::arcium::types::{CallbackAccount, CircuitSource, OffChainCircuitSource};
use arcium_macros::circuit_hash;

pub mod paytable;
pub mod state;

pub use state::*;

const COMP_DEF_OFFSET_INIT_BALANCE: u32 = comp_def_offset("init_balance");
const COMP_DEF_OFFSET_DEPOSIT: u32 = comp_def_offset("deposit");
const COMP_DEF_OFFSET_SPIN: u32 = comp_def_offset("spin");
const COMP_DEF_OFFSET_WITHDRAW: u32 = comp_def_offset("withdraw");

const CIRCUIT_BASE_URL: &str =
    "https://raw.githubusercontent.com/confidential-slots/confidential-slots/main/build";

// Seeds for PDAs
pub const TREASURY_SEED: &[u8] = b"treasury";
pub const REGISTRY_SEED: &[u8] = b"registry";
pub const PLAYER_SEED: &[u8] = b"player";
pub const HISTORY_SEED: &[u8] = b"history";

/// Smallest deposit accepted, 0.001 SOL.
pub const MIN_DEPOSIT: u64 = 1_000_000;
/// A pending computation may be cancelled once it is this old.
pub const PENDING_TIMEOUT_SECS: i64 = 60;

declare_id!("6fQxq2tC8y1kYqkR4ZJ9g1Wv8E7bX4mHn3dUuP5sLrVa");

fn circuit_source(name: &str, hash: [u8; 32]) -> Option<CircuitSource> {
    Some(CircuitSource::OffChain(OffChainCircuitSource {
        source: format!("{}/{}.arcis", CIRCUIT_BASE_URL, name),
        hash,
    }))
}

fn move_lamports(from: &AccountInfo<'_>, to: &AccountInfo<'_>, amount: u64) -> Result<()> {
    let mut from_lamports = from.try_borrow_mut_lamports()?;
    let mut to_lamports = to.try_borrow_mut_lamports()?;
    let remaining = from_lamports
        .checked_sub(amount)
        .ok_or(ErrorCode::InsufficientTreasury)?;
    let credited = to_lamports.checked_add(amount).ok_or(ErrorCode::Overflow)?;
    **from_lamports = remaining;
    **to_lamports = credited;
    Ok(())
}

/// Lamports the treasury holds above its rent-exempt minimum.
fn treasury_free_lamports(treasury: &AccountInfo<'_>) -> Result<u64> {
    let reserve = Rent::get()?.minimum_balance(Treasury::SPACE);
    Ok(treasury.lamports().saturating_sub(reserve))
}

#[arcium_program]
pub mod confidential_slots {
    use super::*;

    pub fn init_init_balance_comp_def(ctx: Context<InitInitBalanceCompDef>) -> Result<()> {
        init_comp_def(
            ctx.accounts,
            circuit_source("init_balance", circuit_hash!("init_balance")),
            None,
        )?;
        Ok(())
    }

    pub fn init_deposit_comp_def(ctx: Context<InitDepositCompDef>) -> Result<()> {
        init_comp_def(
            ctx.accounts,
            circuit_source("deposit", circuit_hash!("deposit")),
            None,
        )?;
        Ok(())
    }

    pub fn init_spin_comp_def(ctx: Context<InitSpinCompDef>) -> Result<()> {
        init_comp_def(
            ctx.accounts,
            circuit_source("spin", circuit_hash!("spin")),
            None,
        )?;
        Ok(())
    }

    pub fn init_withdraw_comp_def(ctx: Context<InitWithdrawCompDef>) -> Result<()> {
        init_comp_def(
            ctx.accounts,
            circuit_source("withdraw", circuit_hash!("withdraw")),
            None,
        )?;
        Ok(())
    }

    /// Create the treasury and the leaderboard registry (only needs to be called once)
    pub fn init_treasury(ctx: Context<InitTreasury>, max_bet: u64) -> Result<()> {
        require!(max_bet > 0, ErrorCode::InvalidMaxBet);

        let treasury = &mut ctx.accounts.treasury;
        treasury.authority = ctx.accounts.authority.key();
        treasury.max_bet = max_bet;
        treasury.total_spins = 0;
        treasury.player_deposits = 0;
        treasury.bump = ctx.bumps.treasury;

        ctx.accounts.registry.bump = ctx.bumps.registry;

        msg!(
            "Treasury initialized with authority: {}, max bet {} lamports",
            ctx.accounts.authority.key(),
            max_bet
        );
        Ok(())
    }

    /// Fund the house bankroll
    pub fn fund_treasury(ctx: Context<FundTreasury>, amount: u64) -> Result<()> {
        system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: ctx.accounts.funder.to_account_info(),
                    to: ctx.accounts.treasury.to_account_info(),
                },
            ),
            amount,
        )?;
        msg!("Treasury funded with {} lamports", amount);
        Ok(())
    }

    pub fn set_max_bet(ctx: Context<SetMaxBet>, max_bet: u64) -> Result<()> {
        require!(max_bet > 0, ErrorCode::InvalidMaxBet);
        ctx.accounts.treasury.max_bet = max_bet;
        msg!("Max bet set to {} lamports", max_bet);
        Ok(())
    }

    /// Create the player's accounts and ask the cluster for an encrypted zero balance.
    pub fn register_player(
        ctx: Context<RegisterPlayer>,
        computation_offset: u64,
        nonce: u128,
    ) -> Result<()> {
        let player_key = ctx.accounts.player.key();
        let player_account_key = ctx.accounts.player_account.key();
        let computation_key = ctx.accounts.computation_account.key();
        let now = Clock::get()?.unix_timestamp;

        let player_account = &mut ctx.accounts.player_account;
        player_account.owner = player_key;
        player_account.bump = ctx.bumps.player_account;
        player_account.begin(PendingKind::Register, 0, computation_key, now)?;

        let history = &mut ctx.accounts.history;
        history.owner = player_key;
        history.bump = ctx.bumps.history;

        if ctx.accounts.registry.register(player_key)? {
            emit!(PlayerRegistered { player: player_key });
        }

        ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;

        let args = ArgBuilder::new().plaintext_u128(nonce).build();

        queue_computation(
            ctx.accounts,
            computation_offset,
            args,
            vec![InitBalanceCallback::callback_ix(
                computation_offset,
                &ctx.accounts.mxe_account,
                &[CallbackAccount {
                    pubkey: player_account_key,
                    is_writable: true,
                }],
            )?],
            1,
            0,
        )?;

        msg!("Registering player {}", player_key);
        Ok(())
    }

    #[arcium_callback(encrypted_ix = "init_balance")]
    pub fn init_balance_callback(
        ctx: Context<InitBalanceCallback>,
        output: SignedComputationOutputs<InitBalanceOutput>,
    ) -> Result<()> {
        let balance = match output.verify_output(
            &ctx.accounts.cluster_account,
            &ctx.accounts.computation_account,
        ) {
            Ok(InitBalanceOutput { field_0 }) => field_0,
            Err(_) => return Err(ErrorCode::AbortedComputation.into()),
        };

        let computation_key = ctx.accounts.computation_account.key();
        let player_account = &mut ctx.accounts.player_account;
        player_account.expect_pending(PendingKind::Register, &computation_key)?;
        player_account.store_balance(balance.ciphertexts[0], balance.nonce);
        player_account.finish();

        msg!("Player {} registered", player_account.owner);
        Ok(())
    }

    /// Move lamports into the treasury and credit them to the encrypted balance.
    pub fn deposit(ctx: Context<Deposit>, computation_offset: u64, amount: u64) -> Result<()> {
        require!(amount >= MIN_DEPOSIT, ErrorCode::DepositTooSmall);

        let player_account_key = ctx.accounts.player_account.key();
        let computation_key = ctx.accounts.computation_account.key();
        let now = Clock::get()?.unix_timestamp;

        ctx.accounts
            .player_account
            .begin(PendingKind::Deposit, amount, computation_key, now)?;

        system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: ctx.accounts.player.to_account_info(),
                    to: ctx.accounts.treasury.to_account_info(),
                },
            ),
            amount,
        )?;
        ctx.accounts.treasury.credit_deposit(amount)?;

        ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;

        let args = ArgBuilder::new()
            .plaintext_u128(ctx.accounts.player_account.balance_nonce)
            .account(player_account_key, PlayerAccount::BALANCE_OFFSET, 32)
            .plaintext_u64(amount)
            .build();

        queue_computation(
            ctx.accounts,
            computation_offset,
            args,
            vec![DepositCallback::callback_ix(
                computation_offset,
                &ctx.accounts.mxe_account,
                &[CallbackAccount {
                    pubkey: player_account_key,
                    is_writable: true,
                }],
            )?],
            1,
            0,
        )?;

        msg!("Deposit of {} lamports queued", amount);
        Ok(())
    }

    #[arcium_callback(encrypted_ix = "deposit")]
    pub fn deposit_callback(
        ctx: Context<DepositCallback>,
        output: SignedComputationOutputs<DepositOutput>,
    ) -> Result<()> {
        let balance = match output.verify_output(
            &ctx.accounts.cluster_account,
            &ctx.accounts.computation_account,
        ) {
            Ok(DepositOutput { field_0 }) => field_0,
            Err(_) => return Err(ErrorCode::AbortedComputation.into()),
        };

        let computation_key = ctx.accounts.computation_account.key();
        let player_account = &mut ctx.accounts.player_account;
        player_account.expect_pending(PendingKind::Deposit, &computation_key)?;
        let amount = player_account.pending_amount;
        player_account.store_balance(balance.ciphertexts[0], balance.nonce);
        player_account.finish();

        emit!(DepositEvent {
            player: player_account.owner,
            amount,
        });
        msg!("Deposited {} lamports", amount);
        Ok(())
    }

    /// Stake an encrypted bet and spin the reels.
    pub fn spin(
        ctx: Context<Spin>,
        computation_offset: u64,
        bet: [u8; 32],     // Encrypted bet in lamports
        pub_key: [u8; 32], // Player's encryption pubkey
        nonce: u128,       // Encryption nonce
    ) -> Result<()> {
        require!(!ctx.accounts.history.is_full(), ErrorCode::HistoryFull);

        let max_bet = ctx.accounts.treasury.max_bet;
        let exposure = paytable::max_exposure(max_bet).ok_or(ErrorCode::Overflow)?;
        let free = treasury_free_lamports(&ctx.accounts.treasury.to_account_info())?;
        require!(
            ctx.accounts.treasury.house_lamports(free) >= exposure,
            ErrorCode::InsufficientTreasury
        );

        let player_account_key = ctx.accounts.player_account.key();
        let history_key = ctx.accounts.history.key();
        let treasury_key = ctx.accounts.treasury.key();
        let computation_key = ctx.accounts.computation_account.key();
        let now = Clock::get()?.unix_timestamp;

        ctx.accounts
            .player_account
            .begin(PendingKind::Spin, 0, computation_key, now)?;

        ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;

        let args = ArgBuilder::new()
            .x25519_pubkey(pub_key)
            .plaintext_u128(nonce)
            .encrypted_u64(bet)
            .plaintext_u128(ctx.accounts.player_account.balance_nonce)
            .account(player_account_key, PlayerAccount::BALANCE_OFFSET, 32)
            .plaintext_u64(max_bet)
            .build();

        queue_computation(
            ctx.accounts,
            computation_offset,
            args,
            vec![SpinCallback::callback_ix(
                computation_offset,
                &ctx.accounts.mxe_account,
                &[
                    CallbackAccount {
                        pubkey: player_account_key,
                        is_writable: true,
                    },
                    CallbackAccount {
                        pubkey: history_key,
                        is_writable: true,
                    },
                    CallbackAccount {
                        pubkey: treasury_key,
                        is_writable: true,
                    },
                ],
            )?],
            1,
            0,
        )?;

        msg!("Spin queued, max bet {} lamports", max_bet);
        Ok(())
    }

    #[arcium_callback(encrypted_ix = "spin")]
    pub fn spin_callback(
        ctx: Context<SpinCallback>,
        output: SignedComputationOutputs<SpinOutput>,
    ) -> Result<()> {
        // (Enc<Mxe, u64>, Enc<Shared, SpinOutcome>) arrives as
        // SpinOutput { field_0: SpinOutputStruct0 { field_0: balance, field_1: outcome } }
        let (balance, outcome) = match output.verify_output(
            &ctx.accounts.cluster_account,
            &ctx.accounts.computation_account,
        ) {
            Ok(SpinOutput {
                field_0:
                    SpinOutputStruct0 {
                        field_0: balance,
                        field_1: outcome,
                    },
            }) => (balance, outcome),
            Err(_) => return Err(ErrorCode::AbortedComputation.into()),
        };

        let computation_key = ctx.accounts.computation_account.key();
        let timestamp = Clock::get()?.unix_timestamp;

        let player_account = &mut ctx.accounts.player_account;
        player_account.expect_pending(PendingKind::Spin, &computation_key)?;
        player_account.store_balance(balance.ciphertexts[0], balance.nonce);
        player_account.finish();

        let index = ctx.accounts.history.append(PlayRecord::new(
            outcome.ciphertexts,
            outcome.nonce,
            timestamp,
        ))?;

        let treasury = &mut ctx.accounts.treasury;
        treasury.total_spins = treasury.total_spins.checked_add(1).ok_or(ErrorCode::Overflow)?;

        emit!(SpinResultEvent {
            player: ctx.accounts.player_account.owner,
            index,
            outcome: outcome.ciphertexts,
            nonce: outcome.nonce,
            timestamp,
        });
        msg!("Spin #{} recorded", index);
        Ok(())
    }

    /// Debit the encrypted balance and pay out from the treasury if it covered `amount`.
    pub fn withdraw(ctx: Context<Withdraw>, computation_offset: u64, amount: u64) -> Result<()> {
        require!(amount > 0, ErrorCode::InvalidAmount);

        let player_key = ctx.accounts.player.key();
        let player_account_key = ctx.accounts.player_account.key();
        let treasury_key = ctx.accounts.treasury.key();
        let computation_key = ctx.accounts.computation_account.key();
        let now = Clock::get()?.unix_timestamp;

        ctx.accounts
            .player_account
            .begin(PendingKind::Withdraw, amount, computation_key, now)?;

        ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;

        let args = ArgBuilder::new()
            .plaintext_u128(ctx.accounts.player_account.balance_nonce)
            .account(player_account_key, PlayerAccount::BALANCE_OFFSET, 32)
            .plaintext_u64(amount)
            .build();

        queue_computation(
            ctx.accounts,
            computation_offset,
            args,
            vec![WithdrawCallback::callback_ix(
                computation_offset,
                &ctx.accounts.mxe_account,
                &[
                    CallbackAccount {
                        pubkey: player_account_key,
                        is_writable: true,
                    },
                    CallbackAccount {
                        pubkey: treasury_key,
                        is_writable: true,
                    },
                    CallbackAccount {
                        pubkey: player_key,
                        is_writable: true,
                    },
                ],
            )?],
            1,
            0,
        )?;

        msg!("Withdrawal of {} lamports queued", amount);
        Ok(())
    }

    #[arcium_callback(encrypted_ix = "withdraw")]
    pub fn withdraw_callback(
        ctx: Context<WithdrawCallback>,
        output: SignedComputationOutputs<WithdrawOutput>,
    ) -> Result<()> {
        let (balance, success) = match output.verify_output(
            &ctx.accounts.cluster_account,
            &ctx.accounts.computation_account,
        ) {
            Ok(WithdrawOutput {
                field_0:
                    WithdrawOutputStruct0 {
                        field_0: balance,
                        field_1: success,
                    },
            }) => (balance, success),
            Err(_) => return Err(ErrorCode::AbortedComputation.into()),
        };

        let computation_key = ctx.accounts.computation_account.key();
        ctx.accounts
            .player_account
            .expect_pending(PendingKind::Withdraw, &computation_key)?;
        require_keys_eq!(
            ctx.accounts.player.key(),
            ctx.accounts.player_account.owner,
            ErrorCode::NotAccountOwner
        );

        let amount = ctx.accounts.player_account.pending_amount;
        if success {
            let treasury_info = ctx.accounts.treasury.to_account_info();
            require!(
                treasury_free_lamports(&treasury_info)? >= amount,
                ErrorCode::InsufficientTreasury
            );
            move_lamports(&treasury_info, &ctx.accounts.player, amount)?;
            ctx.accounts.treasury.debit_player_funds(amount);
        }

        let player_account = &mut ctx.accounts.player_account;
        player_account.store_balance(balance.ciphertexts[0], balance.nonce);
        player_account.finish();

        emit!(WithdrawEvent {
            player: player_account.owner,
            amount,
            success,
        });
        if success {
            msg!("Withdrew {} lamports", amount);
        } else {
            msg!("Withdrawal of {} lamports refused: balance too low", amount);
        }
        Ok(())
    }

    /// Mark a play as claimed. No funds move; winnings are already in the balance.
    pub fn claim_play(ctx: Context<ClaimPlay>, index: u32) -> Result<()> {
        ctx.accounts.history.claim(index)?;
        emit!(PlayClaimedEvent {
            player: ctx.accounts.player.key(),
            index,
        });
        msg!("Play #{} claimed", index);
        Ok(())
    }

    pub fn play_count(ctx: Context<ReadHistory>) -> Result<u32> {
        Ok(ctx.accounts.history.records.len() as u32)
    }

    pub fn get_play(ctx: Context<ReadHistory>, index: u32) -> Result<PlayRecord> {
        Ok(ctx.accounts.history.get(index)?.clone())
    }

    pub fn player_count(ctx: Context<ReadRegistry>) -> Result<u32> {
        Ok(ctx.accounts.registry.players.len() as u32)
    }

    /// Release a player whose computation never came back, refunding an in-flight deposit.
    pub fn cancel_pending(ctx: Context<CancelPending>) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let refund = ctx.accounts.player_account.pending_amount;
        let caller = ctx.accounts.player.key();
        let kind = ctx
            .accounts
            .player_account
            .cancel(&caller, now, PENDING_TIMEOUT_SECS)?;

        let refund = if kind == PendingKind::Deposit { refund } else { 0 };
        if refund > 0 {
            move_lamports(
                &ctx.accounts.treasury.to_account_info(),
                &ctx.accounts.player.to_account_info(),
                refund,
            )?;
            ctx.accounts.treasury.debit_player_funds(refund);
        }

        emit!(PendingCancelledEvent {
            player: ctx.accounts.player.key(),
            kind: kind as u8,
            refund,
        });
        msg!("Pending computation cancelled, {} lamports refunded", refund);
        Ok(())
    }
}

// ============= Context Structs =============

#[derive(Accounts)]
pub struct InitTreasury<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,
    #[account(
        init,
        payer = authority,
        space = Treasury::SPACE,
        seeds = [TREASURY_SEED],
        bump,
    )]
    pub treasury: Account<'info, Treasury>,
    #[account(
        init,
        payer = authority,
        space = PlayerRegistry::SPACE,
        seeds = [REGISTRY_SEED],
        bump,
    )]
    pub registry: Account<'info, PlayerRegistry>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct FundTreasury<'info> {
    #[account(mut)]
    pub funder: Signer<'info>,
    #[account(
        mut,
        seeds = [TREASURY_SEED],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SetMaxBet<'info> {
    pub authority: Signer<'info>,
    #[account(
        mut,
        seeds = [TREASURY_SEED],
        bump = treasury.bump,
        has_one = authority @ ErrorCode::NotTreasuryAuthority,
    )]
    pub treasury: Account<'info, Treasury>,
}

#[queue_computation_accounts("init_balance", player)]
#[derive(Accounts)]
#[instruction(computation_offset: u64)]
pub struct RegisterPlayer<'info> {
    #[account(mut)]
    pub player: Signer<'info>,

    #[account(
        init_if_needed,
        payer = player,
        space = PlayerAccount::SPACE,
        seeds = [PLAYER_SEED, player.key().as_ref()],
        bump,
    )]
    pub player_account: Box<Account<'info, PlayerAccount>>,

    #[account(
        init_if_needed,
        payer = player,
        space = PlayHistory::SPACE,
        seeds = [HISTORY_SEED, player.key().as_ref()],
        bump,
    )]
    pub history: Box<Account<'info, PlayHistory>>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Box<Account<'info, PlayerRegistry>>,

    #[account(
        init_if_needed,
        space = 9,
        payer = player,
        seeds = [b"ArciumSignerAccount"],
        bump,
        address = derive_sign_pda!(),
    )]
    pub sign_pda_account: Account<'info, ArciumSignerAccount>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    #[account(mut, address = derive_mempool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: mempool_account, checked by the arcium program.
    pub mempool_account: UncheckedAccount<'info>,

    #[account(mut, address = derive_execpool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: executing_pool, checked by the arcium program.
    pub executing_pool: UncheckedAccount<'info>,

    #[account(mut, address = derive_comp_pda!(computation_offset, mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: computation_account, checked by the arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_INIT_BALANCE))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(mut, address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(mut, address = ARCIUM_FEE_POOL_ACCOUNT_ADDRESS)]
    pub pool_account: Box<Account<'info, FeePool>>,

    #[account(mut, address = ARCIUM_CLOCK_ACCOUNT_ADDRESS)]
    pub clock_account: Box<Account<'info, ClockAccount>>,

    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("init_balance")]
#[derive(Accounts)]
pub struct InitBalanceCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_INIT_BALANCE))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    /// CHECK: computation_account, checked by arcium program via constraints in the callback context.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar, checked by the account constraint
    pub instructions_sysvar: AccountInfo<'info>,

    #[account(mut)]
    pub player_account: Box<Account<'info, PlayerAccount>>,
}

#[queue_computation_accounts("deposit", player)]
#[derive(Accounts)]
#[instruction(computation_offset: u64)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub player: Signer<'info>,

    #[account(
        mut,
        seeds = [PLAYER_SEED, player.key().as_ref()],
        bump = player_account.bump,
    )]
    pub player_account: Box<Account<'info, PlayerAccount>>,

    #[account(
        mut,
        seeds = [TREASURY_SEED],
        bump = treasury.bump,
    )]
    pub treasury: Box<Account<'info, Treasury>>,

    #[account(
        init_if_needed,
        space = 9,
        payer = player,
        seeds = [b"ArciumSignerAccount"],
        bump,
        address = derive_sign_pda!(),
    )]
    pub sign_pda_account: Account<'info, ArciumSignerAccount>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    #[account(mut, address = derive_mempool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: mempool_account, checked by the arcium program.
    pub mempool_account: UncheckedAccount<'info>,

    #[account(mut, address = derive_execpool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: executing_pool, checked by the arcium program.
    pub executing_pool: UncheckedAccount<'info>,

    #[account(mut, address = derive_comp_pda!(computation_offset, mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: computation_account, checked by the arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_DEPOSIT))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(mut, address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(mut, address = ARCIUM_FEE_POOL_ACCOUNT_ADDRESS)]
    pub pool_account: Box<Account<'info, FeePool>>,

    #[account(mut, address = ARCIUM_CLOCK_ACCOUNT_ADDRESS)]
    pub clock_account: Box<Account<'info, ClockAccount>>,

    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("deposit")]
#[derive(Accounts)]
pub struct DepositCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_DEPOSIT))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    /// CHECK: computation_account, checked by arcium program via constraints in the callback context.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar, checked by the account constraint
    pub instructions_sysvar: AccountInfo<'info>,

    #[account(mut)]
    pub player_account: Box<Account<'info, PlayerAccount>>,
}

#[queue_computation_accounts("spin", player)]
#[derive(Accounts)]
#[instruction(computation_offset: u64)]
pub struct Spin<'info> {
    #[account(mut)]
    pub player: Signer<'info>,

    #[account(
        mut,
        seeds = [PLAYER_SEED, player.key().as_ref()],
        bump = player_account.bump,
    )]
    pub player_account: Box<Account<'info, PlayerAccount>>,

    #[account(
        seeds = [HISTORY_SEED, player.key().as_ref()],
        bump = history.bump,
    )]
    pub history: Box<Account<'info, PlayHistory>>,

    #[account(
        seeds = [TREASURY_SEED],
        bump = treasury.bump,
    )]
    pub treasury: Box<Account<'info, Treasury>>,

    #[account(
        init_if_needed,
        space = 9,
        payer = player,
        seeds = [b"ArciumSignerAccount"],
        bump,
        address = derive_sign_pda!(),
    )]
    pub sign_pda_account: Account<'info, ArciumSignerAccount>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    #[account(mut, address = derive_mempool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: mempool_account, checked by the arcium program.
    pub mempool_account: UncheckedAccount<'info>,

    #[account(mut, address = derive_execpool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: executing_pool, checked by the arcium program.
    pub executing_pool: UncheckedAccount<'info>,

    #[account(mut, address = derive_comp_pda!(computation_offset, mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: computation_account, checked by the arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_SPIN))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(mut, address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(mut, address = ARCIUM_FEE_POOL_ACCOUNT_ADDRESS)]
    pub pool_account: Box<Account<'info, FeePool>>,

    #[account(mut, address = ARCIUM_CLOCK_ACCOUNT_ADDRESS)]
    pub clock_account: Box<Account<'info, ClockAccount>>,

    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("spin")]
#[derive(Accounts)]
pub struct SpinCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_SPIN))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    /// CHECK: computation_account, checked by arcium program via constraints in the callback context.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar, checked by the account constraint
    pub instructions_sysvar: AccountInfo<'info>,

    // Custom accounts passed via CallbackAccount
    #[account(mut)]
    pub player_account: Box<Account<'info, PlayerAccount>>,

    #[account(
        mut,
        constraint = history.owner == player_account.owner @ ErrorCode::NotAccountOwner,
    )]
    pub history: Box<Account<'info, PlayHistory>>,

    #[account(mut)]
    pub treasury: Box<Account<'info, Treasury>>,
}

#[queue_computation_accounts("withdraw", player)]
#[derive(Accounts)]
#[instruction(computation_offset: u64)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub player: Signer<'info>,

    #[account(
        mut,
        seeds = [PLAYER_SEED, player.key().as_ref()],
        bump = player_account.bump,
    )]
    pub player_account: Box<Account<'info, PlayerAccount>>,

    #[account(
        seeds = [TREASURY_SEED],
        bump = treasury.bump,
    )]
    pub treasury: Box<Account<'info, Treasury>>,

    #[account(
        init_if_needed,
        space = 9,
        payer = player,
        seeds = [b"ArciumSignerAccount"],
        bump,
        address = derive_sign_pda!(),
    )]
    pub sign_pda_account: Account<'info, ArciumSignerAccount>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    #[account(mut, address = derive_mempool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: mempool_account, checked by the arcium program.
    pub mempool_account: UncheckedAccount<'info>,

    #[account(mut, address = derive_execpool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: executing_pool, checked by the arcium program.
    pub executing_pool: UncheckedAccount<'info>,

    #[account(mut, address = derive_comp_pda!(computation_offset, mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: computation_account, checked by the arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_WITHDRAW))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(mut, address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(mut, address = ARCIUM_FEE_POOL_ACCOUNT_ADDRESS)]
    pub pool_account: Box<Account<'info, FeePool>>,

    #[account(mut, address = ARCIUM_CLOCK_ACCOUNT_ADDRESS)]
    pub clock_account: Box<Account<'info, ClockAccount>>,

    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("withdraw")]
#[derive(Accounts)]
pub struct WithdrawCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_WITHDRAW))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    /// CHECK: computation_account, checked by arcium program via constraints in the callback context.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar, checked by the account constraint
    pub instructions_sysvar: AccountInfo<'info>,

    // Custom accounts passed via CallbackAccount
    #[account(mut)]
    pub player_account: Box<Account<'info, PlayerAccount>>,

    #[account(mut)]
    pub treasury: Box<Account<'info, Treasury>>,

    /// CHECK: player receiving the withdrawal, matched against player_account.owner
    #[account(mut)]
    pub player: AccountInfo<'info>,
}

#[derive(Accounts)]
pub struct ClaimPlay<'info> {
    pub player: Signer<'info>,

    #[account(
        mut,
        seeds = [HISTORY_SEED, player.key().as_ref()],
        bump = history.bump,
    )]
    pub history: Account<'info, PlayHistory>,
}

#[derive(Accounts)]
pub struct ReadHistory<'info> {
    /// CHECK: only used to derive the history address
    pub owner: UncheckedAccount<'info>,

    #[account(
        seeds = [HISTORY_SEED, owner.key().as_ref()],
        bump = history.bump,
    )]
    pub history: Account<'info, PlayHistory>,
}

#[derive(Accounts)]
pub struct ReadRegistry<'info> {
    #[account(
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Account<'info, PlayerRegistry>,
}

#[derive(Accounts)]
pub struct CancelPending<'info> {
    #[account(mut)]
    pub player: Signer<'info>,

    #[account(
        mut,
        seeds = [PLAYER_SEED, player.key().as_ref()],
        bump = player_account.bump,
        constraint = player_account.owner == player.key() @ ErrorCode::NotAccountOwner,
    )]
    pub player_account: Account<'info, PlayerAccount>,

    #[account(
        mut,
        seeds = [TREASURY_SEED],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,
}

#[init_computation_definition_accounts("init_balance", payer)]
#[derive(Accounts)]
pub struct InitInitBalanceCompDef<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut, address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,
    #[account(mut)]
    /// CHECK: comp_def_account, checked by arcium program.
    pub comp_def_account: UncheckedAccount<'info>,
    #[account(mut, address = derive_mxe_lut_pda!(mxe_account.lut_offset_slot))]
    /// CHECK: address_lookup_table, checked by arcium program.
    pub address_lookup_table: UncheckedAccount<'info>,
    #[account(address = LUT_PROGRAM_ID)]
    /// CHECK: lut_program is the Address Lookup Table program.
    pub lut_program: UncheckedAccount<'info>,
    pub arcium_program: Program<'info, Arcium>,
    pub system_program: Program<'info, System>,
}

#[init_computation_definition_accounts("deposit", payer)]
#[derive(Accounts)]
pub struct InitDepositCompDef<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut, address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,
    #[account(mut)]
    /// CHECK: comp_def_account, checked by arcium program.
    pub comp_def_account: UncheckedAccount<'info>,
    #[account(mut, address = derive_mxe_lut_pda!(mxe_account.lut_offset_slot))]
    /// CHECK: address_lookup_table, checked by arcium program.
    pub address_lookup_table: UncheckedAccount<'info>,
    #[account(address = LUT_PROGRAM_ID)]
    /// CHECK: lut_program is the Address Lookup Table program.
    pub lut_program: UncheckedAccount<'info>,
    pub arcium_program: Program<'info, Arcium>,
    pub system_program: Program<'info, System>,
}

#[init_computation_definition_accounts("spin", payer)]
#[derive(Accounts)]
pub struct InitSpinCompDef<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut, address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,
    #[account(mut)]
    /// CHECK: comp_def_account, checked by arcium program.
    pub comp_def_account: UncheckedAccount<'info>,
    #[account(mut, address = derive_mxe_lut_pda!(mxe_account.lut_offset_slot))]
    /// CHECK: address_lookup_table, checked by arcium program.
    pub address_lookup_table: UncheckedAccount<'info>,
    #[account(address = LUT_PROGRAM_ID)]
    /// CHECK: lut_program is the Address Lookup Table program.
    pub lut_program: UncheckedAccount<'info>,
    pub arcium_program: Program<'info, Arcium>,
    pub system_program: Program<'info, System>,
}

#[init_computation_definition_accounts("withdraw", payer)]
#[derive(Accounts)]
pub struct InitWithdrawCompDef<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut, address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,
    #[account(mut)]
    /// CHECK: comp_def_account, checked by arcium program.
    pub comp_def_account: UncheckedAccount<'info>,
    #[account(mut, address = derive_mxe_lut_pda!(mxe_account.lut_offset_slot))]
    /// CHECK: address_lookup_table, checked by arcium program.
    pub address_lookup_table: UncheckedAccount<'info>,
    #[account(address = LUT_PROGRAM_ID)]
    /// CHECK: lut_program is the Address Lookup Table program.
    pub lut_program: UncheckedAccount<'info>,
    pub arcium_program: Program<'info, Arcium>,
    pub system_program: Program<'info, System>,
}

// ============= Events =============

#[event]
pub struct PlayerRegistered {
    pub player: Pubkey,
}

#[event]
pub struct DepositEvent {
    pub player: Pubkey,
    pub amount: u64,
}

/// Only ciphertexts leave the cluster; the player decrypts with their shared key.
#[event]
pub struct SpinResultEvent {
    pub player: Pubkey,
    pub index: u32,
    pub outcome: [[u8; 32]; OUTCOME_CIPHERTEXTS],
    pub nonce: u128,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawEvent {
    pub player: Pubkey,
    pub amount: u64,
    pub success: bool,
}

#[event]
pub struct PlayClaimedEvent {
    pub player: Pubkey,
    pub index: u32,
}

#[event]
pub struct PendingCancelledEvent {
    pub player: Pubkey,
    pub kind: u8,
    pub refund: u64,
}

// ============= Errors =============

#[error_code]
pub enum ErrorCode {
    #[msg("The computation was aborted")]
    AbortedComputation,
    #[msg("Cluster not set")]
    ClusterNotSet,
    #[msg("Max bet must be positive")]
    InvalidMaxBet,
    #[msg("Amount must be positive")]
    InvalidAmount,
    #[msg("Deposit too small - minimum 0.001 SOL")]
    DepositTooSmall,
    #[msg("Player is already registered")]
    AlreadyRegistered,
    #[msg("Player is not registered")]
    NotRegistered,
    #[msg("Player already has a computation in flight")]
    ComputationPending,
    #[msg("No matching computation is pending")]
    NotPending,
    #[msg("Callback does not belong to the pending computation")]
    ComputationMismatch,
    #[msg("Pending computation has not timed out yet")]
    NotTimedOut,
    #[msg("Treasury cannot cover the payout")]
    InsufficientTreasury,
    #[msg("Play history is full")]
    HistoryFull,
    #[msg("Player registry is full")]
    RegistryFull,
    #[msg("No play at this index")]
    PlayNotFound,
    #[msg("Play already claimed")]
    AlreadyClaimed,
    #[msg("Account does not belong to this player")]
    NotAccountOwner,
    #[msg("Only the treasury authority can do this")]
    NotTreasuryAuthority,
    #[msg("Arithmetic overflow")]
    Overflow,
}
