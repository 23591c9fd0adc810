//! Inbound event vocabulary
//!
//! Buttons carry a callback payload string; these are the payloads the
//! assistant emits and understands.

use std::fmt;

const CATEGORY_PREFIX: &str = "add_category_";
const WEEK_PAGE_PREFIX: &str = "expenses_page_";

/// Discrete guided-entry actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ChooseToday,
    ChooseCustomDate,
    ChooseCategory(String),
    AddNote,
    SkipNote,
    Confirm,
    Cancel,
}

impl Action {
    pub fn payload(&self) -> String {
        match self {
            Action::ChooseToday => "add_date_today".to_string(),
            Action::ChooseCustomDate => "add_date_custom".to_string(),
            Action::ChooseCategory(name) => format!("{}{}", CATEGORY_PREFIX, name),
            Action::AddNote => "add_note".to_string(),
            Action::SkipNote => "add_skip_note".to_string(),
            Action::Confirm => "add_confirm".to_string(),
            Action::Cancel => "add_cancel".to_string(),
        }
    }

    pub fn from_payload(payload: &str) -> Option<Self> {
        let action = match payload {
            "add_date_today" => Action::ChooseToday,
            "add_date_custom" => Action::ChooseCustomDate,
            "add_note" => Action::AddNote,
            "add_skip_note" => Action::SkipNote,
            "add_confirm" => Action::Confirm,
            "add_cancel" => Action::Cancel,
            other => {
                let name = other.strip_prefix(CATEGORY_PREFIX)?;
                if name.is_empty() {
                    return None;
                }
                Action::ChooseCategory(name.to_string())
            },
        };
        Some(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.payload())
    }
}

/// Anything a button press can mean
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Entry(Action),
    /// Weekly summary, `n` weeks back
    WeekPage(u32),
}

impl Callback {
    pub fn parse(payload: &str) -> Option<Self> {
        let payload = payload.trim();
        if let Some(page) = payload.strip_prefix(WEEK_PAGE_PREFIX) {
            return page.parse().ok().map(Callback::WeekPage);
        }
        Action::from_payload(payload).map(Callback::Entry)
    }

    pub fn week_page(weeks_back: u32) -> String {
        format!("{}{}", WEEK_PAGE_PREFIX, weeks_back)
    }
}

/// Input to one guided-entry step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Action(Action),
    Text(String),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Action(action) => write!(f, "button '{}'", action),
            Input::Text(_) => f.write_str("text message"),
        }
    }
}
