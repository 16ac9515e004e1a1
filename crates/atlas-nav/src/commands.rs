//! Command palette parsing.

use atlas_query::SortMode;

use crate::cursor::{GRID_COLUMNS, Layout, Movement};

/// Action to perform after executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// No action.
    None,
    /// Quit the application.
    Quit,
    /// Reload the manifest.
    Reload,
    /// Navigate to a path.
    NavigateTo(String),
    /// Go to root.
    GoToRoot,
    /// Go to the parent directory.
    GoToParent,
    /// Step back through history.
    Back,
    /// Step forward through history.
    Forward,
    /// Show help.
    ShowHelp,
    /// Set sort mode.
    SetSort(SortCommand),
    /// Show, hide or toggle hidden rows.
    SetHidden(Option<bool>),
    /// Start a search.
    Search(String),
    /// Clear the search.
    ClearSearch,
    /// Move the selection.
    Move(Movement),
    /// Select a row by index.
    Select(usize),
    /// Activate the selected row.
    Activate,
    /// Set or clear the display label of the selected row.
    Rename(Option<String>),
    /// Print the current address.
    ShowAddress,
    /// Restore an address.
    GoToAddress(String),
    /// Switch the layout, or toggle between list and grid.
    SetView(Option<Layout>),
    /// List the bookmarks.
    ShowBookmarks,
    /// Navigate to a bookmark by number or label.
    OpenBookmark(String),
}

/// Sort command variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCommand {
    Set(SortMode),
    Cycle,
    Reverse,
}

/// Parse a command string.
pub fn parse_command(cmd: &str) -> CommandAction {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let Some((&head, args)) = parts.split_first() else {
        return CommandAction::None;
    };
    let rest = (!args.is_empty()).then(|| args.join(" "));

    match head {
        "q" | "quit" | "exit" => CommandAction::Quit,

        "r" | "reload" | "refresh" => CommandAction::Reload,

        "cd" => rest.map_or(CommandAction::GoToRoot, CommandAction::NavigateTo),
        "root" | "top" | "~" => CommandAction::GoToRoot,
        "up" | ".." => CommandAction::GoToParent,
        "back" | "b" => CommandAction::Back,
        "forward" | "fwd" => CommandAction::Forward,

        "help" | "?" => CommandAction::ShowHelp,

        "sort" | "s" => match args.first().map(|a| a.to_lowercase()) {
            None => CommandAction::SetSort(SortCommand::Cycle),
            Some(arg) => match arg.as_str() {
                "reverse" | "rev" => CommandAction::SetSort(SortCommand::Reverse),
                "name" | "nm" => CommandAction::SetSort(SortCommand::Set(SortMode::NameAscending)),
                "size" | "sz" => CommandAction::SetSort(SortCommand::Set(SortMode::SizeDescending)),
                "date" | "dt" | "modified" => {
                    CommandAction::SetSort(SortCommand::Set(SortMode::DateDescending))
                }
                "type" | "kind" => CommandAction::SetSort(SortCommand::Set(SortMode::TypeAscending)),
                token => token
                    .parse::<SortMode>()
                    .map_or(CommandAction::SetSort(SortCommand::Cycle), |mode| {
                        CommandAction::SetSort(SortCommand::Set(mode))
                    }),
            },
        },

        "hidden" | "dotfiles" => match args.first().copied() {
            Some("on" | "show" | "1" | "true") => CommandAction::SetHidden(Some(true)),
            Some("off" | "hide" | "0" | "false") => CommandAction::SetHidden(Some(false)),
            _ => CommandAction::SetHidden(None),
        },

        "find" | "search" | "/" => rest.map_or(CommandAction::ClearSearch, CommandAction::Search),
        "clear" | "c" => CommandAction::ClearSearch,

        "j" | "down" => CommandAction::Move(Movement::Down),
        "k" => CommandAction::Move(Movement::Up),
        "h" | "left" => CommandAction::Move(Movement::Left),
        "l" | "right" => CommandAction::Move(Movement::Right),
        "pgup" => CommandAction::Move(Movement::PageUp),
        "pgdn" => CommandAction::Move(Movement::PageDown),
        "home" | "g" => CommandAction::Move(Movement::Home),
        "end" | "G" => CommandAction::Move(Movement::End),

        "sel" | "select" => args
            .first()
            .and_then(|a| a.parse().ok())
            .map_or(CommandAction::None, CommandAction::Select),

        "open" | "o" | "enter" => CommandAction::Activate,

        "rename" | "mv" => CommandAction::Rename(rest),

        "addr" | "address" => CommandAction::ShowAddress,
        "go" => rest.map_or(CommandAction::None, CommandAction::GoToAddress),

        "view" | "v" => match args.first().map(|a| a.to_lowercase()).as_deref() {
            None => CommandAction::SetView(None),
            Some("list") => CommandAction::SetView(Some(Layout::List)),
            Some("grid") => CommandAction::SetView(Some(grid_layout(args.get(1)))),
            Some(_) => CommandAction::None,
        },
        "list" => CommandAction::SetView(Some(Layout::List)),
        "grid" => CommandAction::SetView(Some(grid_layout(args.first()))),

        "bm" | "marks" | "bookmarks" => {
            rest.map_or(CommandAction::ShowBookmarks, CommandAction::OpenBookmark)
        }

        _ => CommandAction::None,
    }
}

fn grid_layout(columns: Option<&&str>) -> Layout {
    Layout::grid(columns.and_then(|c| c.parse().ok()).unwrap_or(GRID_COLUMNS))
}

/// One-line help text for the palette.
pub const HELP: &str = "cd PATH | up | root | back | forward | sort [TOKEN|rev] | hidden [on|off] | \
find TERM | clear | j/k/h/l | pgup/pgdn | home/end | sel N | open | rename [LABEL] | addr | \
go ADDRESS | view [list|grid N] | bm [N|LABEL] | reload | q";
