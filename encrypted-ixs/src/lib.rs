use arcis::*;

#[encrypted]
mod circuits {
    use arcis::*;

    /// Number of distinct reel symbols. Indices 4 and 5 are Seven and Lucky.
    const SYMBOL_COUNT: u128 = 6;
    const SEVEN: u8 = 4;
    const LUCKY: u8 = 5;

    /// Result of one spin, encrypted to the player.
    /// `bet` is the amount actually staked (0 when the bet was rejected).
    pub struct SpinOutcome {
        pub bet: u64,
        pub reel_1: u8,
        pub reel_2: u8,
        pub reel_3: u8,
        pub payout: u64,
    }

    /// Payout multiplier in half-units: payout = bet * halves / 2.
    fn multiplier_halves(a: u8, b: u8, c: u8) -> u64 {
        let ab = a == b;
        let bc = b == c;
        let ac = a == c;

        let triple = ab && bc;
        let pair = (ab || bc || ac) && !triple;

        // With exactly two equal, c is the repeated symbol unless a == b.
        let repeated = if ab { a } else { c };
        let repeated_premium = repeated == SEVEN || repeated == LUCKY;

        let triple_halves: u64 = if a == LUCKY {
            100
        } else if a == SEVEN {
            50
        } else {
            10
        };
        let pair_halves: u64 = if repeated_premium { 4 } else { 1 };

        if triple {
            triple_halves
        } else if pair {
            pair_halves
        } else {
            0
        }
    }

    /// A failed rejection sample falls back to symbol 0 so reels never leave the alphabet.
    fn draw_symbol() -> u8 {
        let (symbol, success) = ArcisRNG::gen_integer_in_range(0u128, SYMBOL_COUNT, 10);
        if success && symbol < SYMBOL_COUNT {
            symbol as u8
        } else {
            0
        }
    }

    /// Fresh zero balance owned by the cluster.
    #[instruction]
    pub fn init_balance(mxe: Mxe) -> Enc<Mxe, u64> {
        mxe.from_arcis(0u64)
    }

    /// Credit a plaintext deposit to the encrypted balance.
    #[instruction]
    pub fn deposit(balance_ctxt: Enc<Mxe, u64>, amount: u64) -> Enc<Mxe, u64> {
        let balance = balance_ctxt.to_arcis();
        balance_ctxt.owner.from_arcis(balance + amount)
    }

    /// Stake an encrypted bet against the encrypted balance and spin three reels.
    ///
    /// A bet that is zero, above `max_bet`, or above the balance stakes nothing:
    /// the reels are still drawn but the payout is zero and the balance is
    /// unchanged. Both paths are evaluated, so the rejection is not observable.
    #[instruction]
    pub fn spin(
        bet_ctxt: Enc<Shared, u64>,
        balance_ctxt: Enc<Mxe, u64>,
        max_bet: u64,
    ) -> (Enc<Mxe, u64>, Enc<Shared, SpinOutcome>) {
        let requested = bet_ctxt.to_arcis();
        let balance = balance_ctxt.to_arcis();

        let accepted = requested > 0 && requested <= max_bet && requested <= balance;
        let bet = if accepted { requested } else { 0 };

        let reel_1 = draw_symbol();
        let reel_2 = draw_symbol();
        let reel_3 = draw_symbol();

        let payout = bet * multiplier_halves(reel_1, reel_2, reel_3) / 2;
        let new_balance = balance - bet + payout;

        let outcome = SpinOutcome {
            bet,
            reel_1,
            reel_2,
            reel_3,
            payout,
        };

        (
            balance_ctxt.owner.from_arcis(new_balance),
            bet_ctxt.owner.from_arcis(outcome),
        )
    }

    /// Debit `amount` if the balance covers it. Only the success bit is revealed.
    #[instruction]
    pub fn withdraw(balance_ctxt: Enc<Mxe, u64>, amount: u64) -> (Enc<Mxe, u64>, bool) {
        let balance = balance_ctxt.to_arcis();
        let sufficient = amount > 0 && balance >= amount;
        let new_balance = if sufficient { balance - amount } else { balance };
        (balance_ctxt.owner.from_arcis(new_balance), sufficient.reveal())
    }
}
