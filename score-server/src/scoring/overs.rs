//! Over accounting engine
//!
//! Pure functions that fold one delivery into an innings total. No I/O and
//! no hidden state: identical `(innings, ball)` input always yields identical
//! output. Everything that mutates an `Innings` goes through here, either
//! directly (recording) or via [`replay`] (undo, verification).

use shared::scoring::{BallEvent, BallInput, ExtraKind, Innings, MAX_RUNS_OFF_BAT, MAX_WICKETS};
use thiserror::Error;

/// Delivery rejections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Innings {0} is already completed")]
    InningsCompleted(u32),

    #[error("Wicket limit exceeded: innings already has 10 wickets")]
    WicketLimitExceeded,

    #[error("Invalid event shape: {0}")]
    InvalidEventShape(String),
}

/// Reject inputs no delivery can produce
pub fn validate_input(input: &BallInput) -> Result<(), DeliveryError> {
    if input.runs_off_bat > MAX_RUNS_OFF_BAT {
        return Err(DeliveryError::InvalidEventShape(format!(
            "runs_off_bat {} exceeds {}",
            input.runs_off_bat, MAX_RUNS_OFF_BAT
        )));
    }
    if matches!(input.extra_kind, ExtraKind::Wide | ExtraKind::NoBall) && input.runs_off_bat != 0 {
        return Err(DeliveryError::InvalidEventShape(format!(
            "{:?} must carry 0 runs_off_bat, got {}",
            input.extra_kind, input.runs_off_bat
        )));
    }
    Ok(())
}

/// Apply one delivery and return the new innings total
///
/// - Wide / NoBall: +1 run, +1 extra, ball count unchanged
/// - Bye / LegBye: runs to total and extras, ball count advances
/// - None: runs to total, ball count advances
/// - Wicket: +1 wicket, rejected once the innings has ten
pub fn apply_delivery(innings: &Innings, ball: &BallEvent) -> Result<Innings, DeliveryError> {
    if innings.is_completed {
        return Err(DeliveryError::InningsCompleted(innings.innings_number));
    }

    validate_input(&ball.input())?;
    if ball.is_legal_delivery != ball.extra_kind.is_legal_delivery() {
        return Err(DeliveryError::InvalidEventShape(format!(
            "is_legal_delivery={} contradicts {:?}",
            ball.is_legal_delivery, ball.extra_kind
        )));
    }

    if ball.is_wicket && innings.total_wickets >= MAX_WICKETS {
        return Err(DeliveryError::WicketLimitExceeded);
    }

    let mut next = innings.clone();
    next.total_runs += ball.runs_off_bat;

    match ball.extra_kind {
        ExtraKind::Wide | ExtraKind::NoBall => {
            next.total_runs += 1;
            next.extras += 1;
        }
        ExtraKind::Bye | ExtraKind::LegBye => {
            next.extras += ball.runs_off_bat;
            next.total_overs = next.total_overs.advance();
        }
        ExtraKind::None => {
            next.total_overs = next.total_overs.advance();
        }
    }

    if ball.is_wicket {
        next.total_wickets += 1;
    }

    Ok(next)
}

/// Rebuild an innings from its delivery log, starting from zero totals
///
/// `template` only contributes the innings identity (number, batting team).
pub fn replay(template: &Innings, balls: &[BallEvent]) -> Result<Innings, DeliveryError> {
    balls
        .iter()
        .try_fold(template.emptied(), |innings, ball| apply_delivery(&innings, ball))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::scoring::OverCount;

    fn ball(seq: u64, input: BallInput) -> BallEvent {
        BallEvent::from_input(seq, &input, 0)
    }

    fn apply_all(inputs: &[BallInput]) -> Result<Innings, DeliveryError> {
        let balls: Vec<BallEvent> = inputs
            .iter()
            .enumerate()
            .map(|(i, input)| ball(i as u64 + 1, *input))
            .collect();
        replay(&Innings::new(1, "A"), &balls)
    }

    #[test]
    fn test_runs_off_bat_advance_ball() {
        let innings = apply_all(&[BallInput::runs(4)]).unwrap();
        assert_eq!(innings.total_runs, 4);
        assert_eq!(innings.extras, 0);
        assert_eq!(innings.total_overs, OverCount::new(0, 1));
    }

    #[test]
    fn test_six_legal_deliveries_complete_over() {
        let inputs = [
            BallInput::runs(0),
            BallInput::extra(ExtraKind::Bye, 1),
            BallInput::runs(2),
            BallInput::extra(ExtraKind::LegBye, 0),
            BallInput::runs(1),
            BallInput::runs(0),
        ];
        let innings = apply_all(&inputs).unwrap();
        assert_eq!(innings.total_overs, OverCount::new(1, 0));
        assert_eq!(innings.total_runs, 4);
        assert_eq!(innings.extras, 1);
    }

    #[test]
    fn test_wides_and_no_balls_never_advance() {
        let inputs = [
            BallInput::extra(ExtraKind::Wide, 0),
            BallInput::extra(ExtraKind::NoBall, 0),
            BallInput::extra(ExtraKind::Wide, 0),
        ];
        let innings = apply_all(&inputs).unwrap();
        assert_eq!(innings.total_overs, OverCount::default());
        assert_eq!(innings.total_runs, 3);
        assert_eq!(innings.extras, 3);
    }

    #[test]
    fn test_wide_with_runs_off_bat_rejected() {
        let err = apply_all(&[BallInput::extra(ExtraKind::Wide, 2)]).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidEventShape(_)));

        let err = apply_all(&[BallInput::extra(ExtraKind::NoBall, 4)]).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidEventShape(_)));
    }

    #[test]
    fn test_excessive_runs_rejected() {
        let err = apply_all(&[BallInput::runs(MAX_RUNS_OFF_BAT + 1)]).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidEventShape(_)));
    }

    #[test]
    fn test_contradictory_legal_flag_rejected() {
        let mut bad = ball(1, BallInput::extra(ExtraKind::Wide, 0));
        bad.is_legal_delivery = true;
        let err = apply_delivery(&Innings::new(1, "A"), &bad).unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidEventShape(_)));
    }

    #[test]
    fn test_wicket_ceiling() {
        let ten = vec![BallInput::wicket(); 10];
        let innings = apply_all(&ten).unwrap();
        assert_eq!(innings.total_wickets, 10);

        let err = apply_delivery(&innings, &ball(11, BallInput::wicket())).unwrap_err();
        assert_eq!(err, DeliveryError::WicketLimitExceeded);

        // Non-wicket deliveries are still accepted at ten down
        let after = apply_delivery(&innings, &ball(11, BallInput::runs(1))).unwrap();
        assert_eq!(after.total_wickets, 10);
    }

    #[test]
    fn test_wicket_on_wide_counts_extra_not_ball() {
        let input = BallInput {
            runs_off_bat: 0,
            extra_kind: ExtraKind::Wide,
            is_wicket: true,
        };
        let innings = apply_all(&[input]).unwrap();
        assert_eq!(innings.total_wickets, 1);
        assert_eq!(innings.total_runs, 1);
        assert_eq!(innings.total_overs.total_balls(), 0);
    }

    #[test]
    fn test_completed_innings_rejected() {
        let mut innings = Innings::new(2, "B");
        innings.is_completed = true;
        let err = apply_delivery(&innings, &ball(1, BallInput::runs(1))).unwrap_err();
        assert_eq!(err, DeliveryError::InningsCompleted(2));
    }

    #[test]
    fn test_apply_is_deterministic() {
        let innings = apply_all(&[BallInput::runs(3), BallInput::wicket()]).unwrap();
        let next = ball(3, BallInput::extra(ExtraKind::LegBye, 2));
        assert_eq!(
            apply_delivery(&innings, &next).unwrap(),
            apply_delivery(&innings, &next).unwrap()
        );
        // Input untouched
        assert_eq!(innings.total_runs, 3);
    }

    #[test]
    fn test_reference_sequence() {
        // [1], [Wide], [4], [wicket], [LegBye:1]
        let inputs = [
            BallInput::runs(1),
            BallInput::extra(ExtraKind::Wide, 0),
            BallInput::runs(4),
            BallInput::wicket(),
            BallInput::extra(ExtraKind::LegBye, 1),
        ];
        let innings = apply_all(&inputs).unwrap();
        assert_eq!(innings.total_runs, 7);
        assert_eq!(innings.total_wickets, 1);
        assert_eq!(innings.total_overs.total_balls(), 4);
        assert_eq!(innings.extras, 2);
    }

    #[test]
    fn test_replay_ignores_template_totals() {
        let mut template = Innings::new(1, "A");
        template.total_runs = 99;
        template.total_overs = OverCount::new(5, 3);
        let innings = replay(&template, &[ball(1, BallInput::runs(2))]).unwrap();
        assert_eq!(innings.total_runs, 2);
        assert_eq!(innings.total_overs, OverCount::new(0, 1));
    }
}
