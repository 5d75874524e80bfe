//! Keyboard shortcuts for the annotation editor.

use crate::model::Tool;

/// A key press as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Backspace,
    Escape,
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Ctrl on Linux/Windows, Cmd on macOS
    pub command: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        command: false,
        shift: false,
    };

    pub const COMMAND: Modifiers = Modifiers {
        command: true,
        shift: false,
    };

    pub const COMMAND_SHIFT: Modifiers = Modifiers {
        command: true,
        shift: true,
    };
}

/// Editor action triggered from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Undo,
    Redo,
    DeleteSelected,
    /// Cancel the current draw, or disarm the tool, or clear the selection
    Escape,
    SelectTool(Tool),
    Save,
}

/// Keybinding configuration for tool hotkeys.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub tool_pin: char,
    pub tool_arrow: char,
    pub tool_rect: char,
    pub tool_circle: char,
    pub tool_text: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            tool_pin: 'p',
            tool_arrow: 'a',
            tool_rect: 'r',
            tool_circle: 'c',
            tool_text: 't',
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the tool that corresponds to a key press, if any.
    pub fn tool_for_key(&self, c: char) -> Option<Tool> {
        let c = c.to_ascii_lowercase();
        Tool::all().iter().copied().find(|tool| self.key_for_tool(*tool) == c)
    }

    /// Get the hotkey for a specific tool.
    pub fn key_for_tool(&self, tool: Tool) -> char {
        match tool {
            Tool::Pin => self.tool_pin,
            Tool::Arrow => self.tool_arrow,
            Tool::Rect => self.tool_rect,
            Tool::Circle => self.tool_circle,
            Tool::Text => self.tool_text,
        }
    }

    /// Map a key press to an editor command.
    pub fn command_for(&self, key: Key, modifiers: Modifiers) -> Option<EditorCommand> {
        match key {
            Key::Delete | Key::Backspace => Some(EditorCommand::DeleteSelected),
            Key::Escape => Some(EditorCommand::Escape),
            Key::Char(c) if modifiers.command => match c.to_ascii_lowercase() {
                'z' if modifiers.shift => Some(EditorCommand::Redo),
                'z' => Some(EditorCommand::Undo),
                'y' => Some(EditorCommand::Redo),
                's' => Some(EditorCommand::Save),
                _ => None,
            },
            Key::Char(c) => self.tool_for_key(c).map(EditorCommand::SelectTool),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_shortcuts() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.command_for(Key::Char('z'), Modifiers::COMMAND),
            Some(EditorCommand::Undo)
        );
        assert_eq!(
            bindings.command_for(Key::Char('Z'), Modifiers::COMMAND_SHIFT),
            Some(EditorCommand::Redo)
        );
        assert_eq!(
            bindings.command_for(Key::Char('y'), Modifiers::COMMAND),
            Some(EditorCommand::Redo)
        );
    }

    #[test]
    fn test_tool_hotkeys() {
        let bindings = KeyBindings::new();
        for tool in Tool::all() {
            let key = bindings.key_for_tool(*tool);
            assert_eq!(
                bindings.command_for(Key::Char(key), Modifiers::NONE),
                Some(EditorCommand::SelectTool(*tool))
            );
        }
        assert_eq!(bindings.command_for(Key::Char('x'), Modifiers::NONE), None);
    }

    #[test]
    fn test_plain_s_is_not_save() {
        let bindings = KeyBindings::new();
        assert_eq!(bindings.command_for(Key::Char('s'), Modifiers::NONE), None);
        assert_eq!(
            bindings.command_for(Key::Char('s'), Modifiers::COMMAND),
            Some(EditorCommand::Save)
        );
    }
}
