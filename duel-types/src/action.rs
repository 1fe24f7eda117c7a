//! The canonical action vocabulary the orchestrator reasons about.

use serde::{Deserialize, Serialize};

/// Canonical action names, normalized from whatever the server or the
/// model spells them as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalAction {
    /// Summon a monster (tribute or normal).
    SummonMonster,
    /// Set a monster or spell/trap face-down.
    SetCard,
    /// Activate a spell card.
    ActivateSpell,
    /// Activate a trap card.
    ActivateTrap,
    /// Declare an attack.
    Attack,
    /// Advance to the battle phase.
    EnterBattlePhase,
    /// Advance to the second main phase.
    EnterMainPhase2,
    /// Change a monster's battle position.
    ChangePosition,
    /// Flip-summon a face-down monster.
    FlipSummon,
    /// End the current turn.
    EndTurn,
    /// Respond to an open chain.
    ChainResponse,
    /// Pass on an open chain.
    PassChain,
}

impl CanonicalAction {
    /// All canonical actions, in a stable order.
    pub const ALL: [CanonicalAction; 12] = [
        CanonicalAction::SummonMonster,
        CanonicalAction::SetCard,
        CanonicalAction::ActivateSpell,
        CanonicalAction::ActivateTrap,
        CanonicalAction::Attack,
        CanonicalAction::EnterBattlePhase,
        CanonicalAction::EnterMainPhase2,
        CanonicalAction::ChangePosition,
        CanonicalAction::FlipSummon,
        CanonicalAction::EndTurn,
        CanonicalAction::ChainResponse,
        CanonicalAction::PassChain,
    ];

    /// Normalize a loosely-spelled action name (from the server or the
    /// model) into the canonical set. Unknown names return `None`.
    pub fn normalize(raw: &str) -> Option<CanonicalAction> {
        let key = raw.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        let action = match key.as_str() {
            "SUMMON_MONSTER" | "NORMAL_SUMMON" | "SUMMON" | "TRIBUTE_SUMMON" => {
                CanonicalAction::SummonMonster
            }
            "SET_CARD" | "SET_MONSTER" | "SET_SPELL_TRAP" | "SET" => CanonicalAction::SetCard,
            "ACTIVATE_SPELL" | "ACTIVATE_SPELL_CARD" => CanonicalAction::ActivateSpell,
            "ACTIVATE_TRAP" | "ACTIVATE_TRAP_CARD" => CanonicalAction::ActivateTrap,
            "ATTACK" | "DECLARE_ATTACK" => CanonicalAction::Attack,
            "ENTER_BATTLE_PHASE" | "BATTLE_PHASE" | "ADVANCE_TO_BATTLE" => {
                CanonicalAction::EnterBattlePhase
            }
            "ENTER_MAIN_PHASE_2" | "MAIN_PHASE_2" | "MAIN_PHASE2" => {
                CanonicalAction::EnterMainPhase2
            }
            "CHANGE_POSITION" | "SWITCH_POSITION" => CanonicalAction::ChangePosition,
            "FLIP_SUMMON" => CanonicalAction::FlipSummon,
            "END_TURN" | "PASS_TURN" | "PASS" => CanonicalAction::EndTurn,
            "CHAIN_RESPONSE" | "RESPOND_TO_CHAIN" => CanonicalAction::ChainResponse,
            "PASS_CHAIN" | "CHAIN_PASS" => CanonicalAction::PassChain,
            _ => return None,
        };
        Some(action)
    }

    /// The raw server-facing spelling of this action (snake_case).
    pub fn server_name(self) -> &'static str {
        match self {
            CanonicalAction::SummonMonster => "summon_monster",
            CanonicalAction::SetCard => "set_card",
            CanonicalAction::ActivateSpell => "activate_spell",
            CanonicalAction::ActivateTrap => "activate_trap",
            CanonicalAction::Attack => "attack",
            CanonicalAction::EnterBattlePhase => "enter_battle_phase",
            CanonicalAction::EnterMainPhase2 => "enter_main_phase_2",
            CanonicalAction::ChangePosition => "change_position",
            CanonicalAction::FlipSummon => "flip_summon",
            CanonicalAction::EndTurn => "end_turn",
            CanonicalAction::ChainResponse => "chain_response",
            CanonicalAction::PassChain => "pass_chain",
        }
    }
}
