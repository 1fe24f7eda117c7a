//! Legality enforcement and the fallback priority order.

use crate::decision::ActionChoice;
use duel_types::CanonicalAction;

/// Priority order consulted when a chosen action isn't legal and no
/// special-case rewrite applies, and by the deterministic fallback
/// tier once the model budget is exhausted.
pub const FALLBACK_PRIORITY: [CanonicalAction; 9] = [
    CanonicalAction::Attack,
    CanonicalAction::EnterBattlePhase,
    CanonicalAction::SummonMonster,
    CanonicalAction::ActivateSpell,
    CanonicalAction::SetCard,
    CanonicalAction::ChangePosition,
    CanonicalAction::FlipSummon,
    CanonicalAction::EnterMainPhase2,
    CanonicalAction::EndTurn,
];

/// Validate `choice` against `legal`, rewriting or replacing it as
/// needed so the orchestrator only ever executes a legal action.
pub fn ensure_legal(choice: ActionChoice, legal: &[CanonicalAction]) -> ActionChoice {
    if legal.contains(&choice.action) {
        return choice;
    }

    if choice.action == CanonicalAction::Attack && legal.contains(&CanonicalAction::EnterBattlePhase) {
        return ActionChoice::new(
            CanonicalAction::EnterBattlePhase,
            format!(
                "requested action was illegal ({:?} not currently permitted); entering battle phase instead",
                choice.action
            ),
            choice.source,
        );
    }

    let fallback = FALLBACK_PRIORITY
        .into_iter()
        .find(|a| legal.contains(a))
        .unwrap_or(CanonicalAction::EndTurn);

    ActionChoice::new(
        fallback,
        format!("requested action was illegal ({:?} not currently permitted); falling back", choice.action),
        choice.source,
    )
}

/// Run the deterministic fallback tier: same priority order, but
/// starting fresh rather than rewriting a prior choice (used once the
/// model budget for the turn is exhausted).
pub fn fallback_decision(legal: &[CanonicalAction]) -> ActionChoice {
    let action = FALLBACK_PRIORITY.into_iter().find(|a| legal.contains(a)).unwrap_or(CanonicalAction::EndTurn);
    ActionChoice::new(action, "deterministic fallback selector", duel_types::DecisionSourceKind::Fallback)
}
