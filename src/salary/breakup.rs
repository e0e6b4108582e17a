/// Standard split of a total compensation figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakup {
    pub basic: f64,
    pub housing: f64,
    pub dearness: f64,
    pub travel: f64,
    pub special: f64,
}

/// Fixed percentages: basic 40%, housing 20%, dearness 10%, travel 5%,
/// each rounded to the nearest unit independently. Special absorbs the
/// rounding remainder so the five components always sum exactly to
/// `total`. Callers guarantee `total >= 0` and finite.
pub fn standard_breakup(total: f64) -> Breakup {
    let basic = (total * 0.40).round();
    let housing = (total * 0.20).round();
    let dearness = (total * 0.10).round();
    let travel = (total * 0.05).round();
    let special = total - (basic + housing + dearness + travel);

    Breakup {
        basic,
        housing,
        dearness,
        travel,
        special,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_twelve_thousand() {
        let b = standard_breakup(12000.0);
        assert_eq!(b.basic, 4800.0);
        assert_eq!(b.housing, 2400.0);
        assert_eq!(b.dearness, 1200.0);
        assert_eq!(b.travel, 600.0);
        assert_eq!(b.special, 3000.0);
    }

    #[test]
    fn components_sum_exactly_to_total() {
        for total in [0.0, 1.0, 99.0, 101.0, 7777.0, 12345.67, 999999.99] {
            let b = standard_breakup(total);
            let sum = b.basic + b.housing + b.dearness + b.travel + b.special;
            assert_eq!(sum, total, "sum drifted for total {}", total);
        }
    }

    #[test]
    fn zero_total_is_all_zero() {
        let b = standard_breakup(0.0);
        assert_eq!(b.basic, 0.0);
        assert_eq!(b.housing, 0.0);
        assert_eq!(b.dearness, 0.0);
        assert_eq!(b.travel, 0.0);
        assert_eq!(b.special, 0.0);
    }

    #[test]
    fn special_absorbs_rounding_remainder() {
        // 101 * 0.05 = 5.05 rounds to 5; the off-by-rounding lands in special.
        let b = standard_breakup(101.0);
        assert_eq!(b.basic, 40.0);
        assert_eq!(b.housing, 20.0);
        assert_eq!(b.dearness, 10.0);
        assert_eq!(b.travel, 5.0);
        assert_eq!(b.special, 26.0);
    }
}
