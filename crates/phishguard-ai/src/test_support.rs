//! Small separable fixture corpus shared by unit tests.

use phishguard_core::{Label, LabelledText};

const SPAM: &[&str] = &[
    "WIN a FREE prize now, claim your cash reward",
    "URGENT: claim your cash prize today",
    "Free entry to win cash, txt WIN to 80086",
    "Congratulations you won a free holiday prize",
    "Claim your reward: free cash waiting",
    "You have won a guaranteed cash prize, call to claim",
    "Free ringtone! txt FREE to claim your reward",
    "Winner! urgent cash reward unclaimed",
    "Txt to win free tickets and cash",
    "Exclusive prize draw: claim free cash now",
    "Urgent reward notice, your prize expires",
    "Win win win free cash bonus",
    "Your mobile number won a cash prize, claim today",
    "Free credit reward, txt claim to redeem",
    "Last chance to claim your free prize",
    "Cash bonus waiting, urgent claim required",
    "Guaranteed winner, free cash prize awaits",
    "Claim free vouchers and cash rewards",
    "Prize notification: you won free cash",
    "Urgent! your free reward is ready to claim",
];

const HAM: &[&str] = &[
    "Are we still meeting for lunch tomorrow?",
    "Mum says dinner is at seven tonight",
    "Running late, see you at home soon",
    "Can you pick up milk on the way home",
    "Meeting moved to tomorrow morning",
    "Lunch was great, thanks again",
    "Dinner at grandma's house on Sunday",
    "I'll call you after the meeting",
    "Home now, how was your day",
    "Tomorrow's lunch is at the usual place",
    "Did mum get home safely?",
    "Let's do dinner tomorrow instead",
    "Sorry, stuck in a meeting until five",
    "Heading home after lunch",
    "Happy birthday! dinner is on me tonight",
    "Can we move the meeting to lunch time",
    "Mum cooked dinner, come home early",
    "See you tomorrow at the office",
    "Lunch meeting went well today",
    "Are you home for dinner tonight?",
];

pub(crate) fn reference_rows() -> Vec<LabelledText> {
    SPAM.iter()
        .zip(HAM)
        .flat_map(|(s, h)| {
            [
                LabelledText::new(Label::Spam, *s),
                LabelledText::new(Label::Ham, *h),
            ]
        })
        .collect()
}

pub(crate) fn reference_tsv() -> String {
    reference_rows()
        .iter()
        .map(|r| format!("{}\t{}\n", r.label, r.text))
        .collect()
}
