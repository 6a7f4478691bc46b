//! Plaintext reference of the payout table evaluated by the `spin` circuit.
//!
//! Multipliers are kept in half-units so that the 0.5x pair payout stays an
//! integer: `payout = bet * halves / 2`, rounded down.

pub const SYMBOL_COUNT: u8 = 6;

/// Largest multiplier any spin can produce (Lucky triple, 50x).
pub const MAX_MULTIPLIER_HALVES: u64 = 100;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Cherry = 0,
    Lemon = 1,
    Bell = 2,
    Diamond = 3,
    Seven = 4,
    Lucky = 5,
}

impl Symbol {
    pub const ALL: [Symbol; 6] = [
        Symbol::Cherry,
        Symbol::Lemon,
        Symbol::Bell,
        Symbol::Diamond,
        Symbol::Seven,
        Symbol::Lucky,
    ];

    pub fn from_index(index: u8) -> Option<Symbol> {
        Symbol::ALL.get(index as usize).copied()
    }

    pub fn is_premium(self) -> bool {
        matches!(self, Symbol::Seven | Symbol::Lucky)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Multiplier {
    LuckyTriple,
    SevenTriple,
    Triple,
    PremiumPair,
    Pair,
    Nothing,
}

impl Multiplier {
    pub fn evaluate(reels: [Symbol; 3]) -> Multiplier {
        let [a, b, c] = reels;
        if a == b && b == c {
            return match a {
                Symbol::Lucky => Multiplier::LuckyTriple,
                Symbol::Seven => Multiplier::SevenTriple,
                _ => Multiplier::Triple,
            };
        }

        let repeated = if a == b || a == c {
            a
        } else if b == c {
            b
        } else {
            return Multiplier::Nothing;
        };

        if repeated.is_premium() {
            Multiplier::PremiumPair
        } else {
            Multiplier::Pair
        }
    }

    pub fn halves(self) -> u64 {
        match self {
            Multiplier::LuckyTriple => 100,
            Multiplier::SevenTriple => 50,
            Multiplier::Triple => 10,
            Multiplier::PremiumPair => 4,
            Multiplier::Pair => 1,
            Multiplier::Nothing => 0,
        }
    }
}

/// Multiplier halves for three raw reel indices, `None` if any index is not a symbol.
pub fn multiplier_halves(a: u8, b: u8, c: u8) -> Option<u64> {
    let reels = [
        Symbol::from_index(a)?,
        Symbol::from_index(b)?,
        Symbol::from_index(c)?,
    ];
    Some(Multiplier::evaluate(reels).halves())
}

/// Branchless form evaluated by the `spin` circuit, kept statement for statement.
pub fn selected_halves(a: u8, b: u8, c: u8) -> u64 {
    const SEVEN: u8 = Symbol::Seven as u8;
    const LUCKY: u8 = Symbol::Lucky as u8;

    let ab = a == b;
    let bc = b == c;
    let ac = a == c;

    let triple = ab && bc;
    let pair = (ab || bc || ac) && !triple;

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

/// Reel index produced by the circuit from one `(value, success)` RNG draw.
pub fn reel_from_draw(value: u128, success: bool) -> u8 {
    if success && value < SYMBOL_COUNT as u128 {
        value as u8
    } else {
        0
    }
}

pub fn payout(bet: u64, reels: [Symbol; 3]) -> Option<u64> {
    bet.checked_mul(Multiplier::evaluate(reels).halves())
        .map(|scaled| scaled / 2)
}

/// Lamports the house must hold to cover a single maximum bet hitting the top prize.
pub fn max_exposure(max_bet: u64) -> Option<u64> {
    max_bet
        .checked_mul(MAX_MULTIPLIER_HALVES)
        .map(|scaled| scaled / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_spins() -> impl Iterator<Item = [Symbol; 3]> {
        Symbol::ALL.into_iter().flat_map(|a| {
            Symbol::ALL
                .into_iter()
                .flat_map(move |b| Symbol::ALL.into_iter().map(move |c| [a, b, c]))
        })
    }

    fn count(m: Multiplier) -> usize {
        all_spins()
            .filter(|reels| Multiplier::evaluate(*reels) == m)
            .count()
    }

    #[test]
    fn table_covers_every_spin() {
        assert_eq!(all_spins().count(), 216);
        assert_eq!(count(Multiplier::LuckyTriple), 1);
        assert_eq!(count(Multiplier::SevenTriple), 1);
        assert_eq!(count(Multiplier::Triple), 4);
        // 3 positions for the odd reel * 5 other symbols, per repeated symbol.
        assert_eq!(count(Multiplier::PremiumPair), 2 * 15);
        assert_eq!(count(Multiplier::Pair), 4 * 15);
        assert_eq!(count(Multiplier::Nothing), 6 * 5 * 4);
    }

    #[test]
    fn order_does_not_matter() {
        for [a, b, c] in all_spins() {
            let m = Multiplier::evaluate([a, b, c]);
            for permuted in [[a, c, b], [b, a, c], [b, c, a], [c, a, b], [c, b, a]] {
                assert_eq!(Multiplier::evaluate(permuted), m);
            }
        }
    }

    #[test]
    fn named_rows() {
        use Symbol::*;
        assert_eq!(Multiplier::evaluate([Lucky, Lucky, Lucky]).halves(), 100);
        assert_eq!(Multiplier::evaluate([Seven, Seven, Seven]).halves(), 50);
        assert_eq!(Multiplier::evaluate([Bell, Bell, Bell]).halves(), 10);
        assert_eq!(Multiplier::evaluate([Seven, Cherry, Seven]).halves(), 4);
        assert_eq!(Multiplier::evaluate([Lemon, Lucky, Lucky]).halves(), 4);
        assert_eq!(Multiplier::evaluate([Diamond, Diamond, Lucky]).halves(), 1);
        assert_eq!(Multiplier::evaluate([Cherry, Lemon, Seven]).halves(), 0);
    }

    #[test]
    fn half_multiplier_rounds_down() {
        use Symbol::*;
        assert_eq!(payout(3, [Bell, Bell, Cherry]), Some(1));
        assert_eq!(payout(1_000, [Bell, Bell, Cherry]), Some(500));
        assert_eq!(payout(1_000, [Lucky, Lucky, Lucky]), Some(50_000));
        assert_eq!(payout(u64::MAX, [Lucky, Lucky, Lucky]), None);
    }

    #[test]
    fn circuit_selection_matches_table() {
        for reels in all_spins() {
            let [a, b, c] = reels.map(|s| s as u8);
            assert_eq!(
                selected_halves(a, b, c),
                Multiplier::evaluate(reels).halves(),
                "reels {:?}",
                reels
            );
        }
    }

    #[test]
    fn failed_draws_stay_in_alphabet() {
        for value in 0..SYMBOL_COUNT as u128 {
            assert_eq!(reel_from_draw(value, true), value as u8);
            assert_eq!(reel_from_draw(value, false), 0);
        }
        for value in [6u128, 7, 255, u128::MAX] {
            for success in [true, false] {
                let reel = reel_from_draw(value, success);
                assert!(Symbol::from_index(reel).is_some());
            }
        }
        // A triple of failed draws is a Cherry triple, paid as any plain triple.
        let reel = reel_from_draw(6, false);
        assert_eq!(multiplier_halves(reel, reel, reel), Some(10));
    }

    #[test]
    fn raw_indices() {
        assert_eq!(multiplier_halves(5, 5, 5), Some(100));
        assert_eq!(multiplier_halves(0, 1, 2), Some(0));
        assert_eq!(multiplier_halves(0, 0, 6), None);
        assert_eq!(Symbol::from_index(SYMBOL_COUNT), None);
    }

    #[test]
    fn exposure_is_top_prize() {
        assert_eq!(max_exposure(1_000_000), Some(50_000_000));
        assert_eq!(max_exposure(u64::MAX), None);
    }
}
