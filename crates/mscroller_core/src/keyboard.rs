/// A key as reported by the page's keydown handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowUp,
    ArrowDown,
    Char(char),
    Other,
}

/// Where keyboard focus was when the key went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Page,
    TextInput,
    TextArea,
    Editable,
}

impl Focus {
    pub fn accepts_text(self) -> bool {
        !matches!(self, Focus::Page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub focus: Focus,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            focus: Focus::Page,
        }
    }

    pub fn shifted(key: Key) -> Self {
        Self {
            shift: true,
            ..Self::plain(key)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Toggle,
    Faster,
    Slower,
    Next,
    Previous,
    TogglePanel,
}

/// Maps a keydown to a shortcut. Keys typed into text fields never map.
pub fn shortcut_for(input: KeyInput) -> Option<Shortcut> {
    if input.focus.accepts_text() {
        return None;
    }
    match input.key {
        Key::Space if !input.shift && !input.ctrl => Some(Shortcut::Toggle),
        Key::ArrowUp if input.shift => Some(Shortcut::Faster),
        Key::ArrowDown if input.shift => Some(Shortcut::Slower),
        Key::Char(c) if !input.ctrl => match c.to_ascii_lowercase() {
            'n' => Some(Shortcut::Next),
            'p' => Some(Shortcut::Previous),
            'h' => Some(Shortcut::TogglePanel),
            _ => None,
        },
        _ => None,
    }
}
