//! Menu state machine.
//!
//! The menu is an explicit finite-state enumeration with a pure
//! transition function: given the current state and the operator's
//! input it names the action to perform and the state that follows.
//! All I/O (prompting, rendering, connector calls) lives in `main.rs`;
//! nothing here touches the terminal or the network.

/// Where the operator currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    /// Top-level menu, no chat open.
    Main,
    /// Inside a selected chat.
    Chat,
    /// Terminal state: leave the program.
    Quit,
}

/// What the run loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ListChats,
    OpenChat,
    ShowBalance,
    ShowSettings,
    ShowHistory,
    Ask,
    SetSystemPrompt,
    LeaveChat,
    Quit,
    /// Unrecognized input; state does not change.
    Invalid,
}

/// Menu entries rendered for a state: `(key, caption)` pairs.
pub fn menu_items(state: MenuState) -> &'static [(&'static str, &'static str)] {
    match state {
        MenuState::Main => &[
            ("1", "List chats"),
            ("2", "Open or create a chat"),
            ("3", "Show balance"),
            ("4", "Show settings"),
            ("0", "Quit"),
        ],
        MenuState::Chat => &[
            ("1", "Show history"),
            ("2", "Ask"),
            ("3", "Set system prompt"),
            ("0", "Back to main menu"),
        ],
        MenuState::Quit => &[],
    }
}

/// Pure transition function: `(state, input) -> (action, next state)`.
pub fn transition(state: MenuState, input: &str) -> (MenuAction, MenuState) {
    match (state, input.trim()) {
        (MenuState::Main, "1") => (MenuAction::ListChats, MenuState::Main),
        (MenuState::Main, "2") => (MenuAction::OpenChat, MenuState::Chat),
        (MenuState::Main, "3") => (MenuAction::ShowBalance, MenuState::Main),
        (MenuState::Main, "4") => (MenuAction::ShowSettings, MenuState::Main),
        (MenuState::Main, "0") => (MenuAction::Quit, MenuState::Quit),
        (MenuState::Chat, "1") => (MenuAction::ShowHistory, MenuState::Chat),
        (MenuState::Chat, "2") => (MenuAction::Ask, MenuState::Chat),
        (MenuState::Chat, "3") => (MenuAction::SetSystemPrompt, MenuState::Chat),
        (MenuState::Chat, "0") => (MenuAction::LeaveChat, MenuState::Main),
        (state, _) => (MenuAction::Invalid, state),
    }
}
