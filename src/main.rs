//! atlas - browse a static file collection from its manifest.
//!
//! Usage:
//!   atlas generate [ROOT]          Write a manifest for a directory
//!   atlas ls MANIFEST [PATH]       List a directory
//!   atlas find MANIFEST TERM       Search below a directory
//!   atlas tree MANIFEST [PATH]     Print a subtree
//!   atlas address MANIFEST ADDR    Restore a state from an address
//!   atlas browse MANIFEST          Drive a session from stdin commands
//!   atlas --help                   Show help

mod logging;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};

use atlas_core::{Manifest, ManifestError, Node, VirtualTree, build_tree, path};
use atlas_nav::{
    Activation, CommandAction, HELP, Layout, PreviewContent, PreviewLoader, Session, SortCommand,
    UserSettings, address, load_manifest, load_manifest_stdin, parse_command,
};
use atlas_query::{SortMode, ViewSpec, visible_rows};
use atlas_scan::{JwalkScanner, ScanConfig, literal_pattern};

#[derive(Parser)]
#[command(
    name = "atlas",
    version,
    about = "Browse a static file collection from its manifest",
    long_about = "atlas turns a flat manifest of paths into a navigable tree.\n\n\
                  Generate a manifest with `atlas generate`, then list, search \
                  and browse it. Use `-` as MANIFEST to read it from stdin."
)]
struct Cli {
    /// Log debug output to stderr (ATLAS_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk a directory and write its manifest
    Generate {
        /// Directory to index
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extra exclusion glob, matched against names and relative paths
        #[arg(short, long = "exclude", value_name = "GLOB")]
        excludes: Vec<String>,

        /// Include dotfiles
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        hidden: bool,

        /// Maximum depth to walk
        #[arg(short, long)]
        depth: Option<u32>,
    },

    /// List the rows of a directory
    Ls {
        /// Manifest file, or - for stdin
        manifest: PathBuf,

        /// Directory to list
        #[arg(default_value = "/")]
        path: String,

        /// Sort token (name-asc, size-desc, date-desc, type-asc, ...)
        #[arg(short, long, default_value = "name-asc")]
        sort: SortMode,

        /// Show dotfiles
        #[arg(short, long)]
        all: bool,
    },

    /// Search names below a directory
    Find {
        /// Manifest file, or - for stdin
        manifest: PathBuf,

        /// Case-insensitive substring to look for
        term: String,

        /// Directory the search is scoped to
        #[arg(long = "in", default_value = "/")]
        scope: String,

        /// Maximum depth below the scope
        #[arg(short, long)]
        depth: Option<usize>,

        /// Sort token
        #[arg(short, long, default_value = "name-asc")]
        sort: SortMode,

        /// Show dotfiles
        #[arg(short, long)]
        all: bool,
    },

    /// Print a subtree
    Tree {
        /// Manifest file, or - for stdin
        manifest: PathBuf,

        /// Directory to start from
        #[arg(default_value = "/")]
        path: String,

        /// Maximum depth to display
        #[arg(short, long, default_value = "3")]
        depth: u32,

        /// Show dotfiles
        #[arg(short, long)]
        all: bool,
    },

    /// Restore a state from an address and print its canonical form
    Address {
        /// Manifest file, or - for stdin
        manifest: PathBuf,

        /// Address, e.g. "?path=/docs&sort=size-desc"
        address: String,
    },

    /// Read palette commands from stdin and print the view after each
    Browse {
        /// Manifest file
        manifest: PathBuf,

        /// Initial address (settings are used when absent)
        #[arg(short, long)]
        address: Option<String>,

        /// Lay rows out in a grid with this many columns
        #[arg(short, long)]
        columns: Option<usize>,

        /// Local copy of the collection used for previews
        #[arg(long)]
        content_root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Generate {
            root,
            output,
            excludes,
            hidden,
            depth,
        } => run_generate(root, output, excludes, hidden, depth).await,
        Command::Ls {
            manifest,
            path,
            sort,
            all,
        } => run_ls(&manifest, &path, sort, all).await,
        Command::Find {
            manifest,
            term,
            scope,
            depth,
            sort,
            all,
        } => run_find(&manifest, &term, &scope, depth, sort, all).await,
        Command::Tree {
            manifest,
            path,
            depth,
            all,
        } => run_tree(&manifest, &path, depth, all).await,
        Command::Address { manifest, address } => run_address(&manifest, &address).await,
        Command::Browse {
            manifest,
            address,
            columns,
            content_root,
        } => run_browse(manifest, address, columns, content_root).await,
    }
}

/// Walk a directory and write its manifest.
async fn run_generate(
    root: PathBuf,
    output: Option<PathBuf>,
    excludes: Vec<String>,
    hidden: bool,
    depth: Option<u32>,
) -> Result<()> {
    let mut config = ScanConfig::new(&root);
    config.include_hidden = hidden;
    config.max_depth = depth;
    config.exclude_patterns.extend(excludes);

    // Keep the manifest out of its own listing.
    if let Some(output) = &output {
        let root = root.canonicalize().context("Invalid root")?;
        let output = std::path::absolute(output).context("Invalid output path")?;
        config.exclude_patterns.extend(output_exclusion(&root, &output));
    }

    eprintln!("Indexing {}...", root.display());

    let manifest = tokio::task::spawn_blocking(move || JwalkScanner::new().scan(&config))
        .await
        .context("Scan task failed")?
        .context("Scan failed")?;
    let json = manifest.to_json_pretty()?;

    match output {
        Some(output) => {
            tokio::fs::write(&output, json)
                .await
                .with_context(|| format!("Cannot write {}", output.display()))?;
            eprintln!(
                "Wrote {} records to {}{}",
                manifest.len(),
                output.display(),
                manifest
                    .short_version()
                    .map(|v| format!(" @ {v}"))
                    .unwrap_or_default()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// List the rows of one directory.
async fn run_ls(source: &Path, dir: &str, sort: SortMode, all: bool) -> Result<()> {
    let tree = open_tree(source).await?;
    let dir = path::normalize(dir);
    if !tree.is_directory(&dir) {
        bail!("Not a directory: {dir}");
    }

    let view = ViewSpec {
        show_hidden: all,
        sort,
        ..ViewSpec::listing(&dir)
    };
    for node in visible_rows(&tree, &view) {
        println!("{}", format_row(node, node.display_name()));
    }
    Ok(())
}

/// Search below a directory.
async fn run_find(
    source: &Path,
    term: &str,
    scope: &str,
    depth: Option<usize>,
    sort: SortMode,
    all: bool,
) -> Result<()> {
    let tree = open_tree(source).await?;
    let scope = path::normalize(scope);
    if !tree.is_directory(&scope) {
        bail!("Not a directory: {scope}");
    }

    let term = term.trim();
    let view = ViewSpec {
        directory: &scope,
        query: term,
        show_hidden: all,
        sort,
        max_depth: depth,
    };
    let rows = visible_rows(&tree, &view);
    for node in &rows {
        println!("{}", format_row(node, &node.path));
    }
    eprintln!("{} match(es) for “{term}” in {scope}", rows.len());
    Ok(())
}

/// Print a subtree.
async fn run_tree(source: &Path, start: &str, max_depth: u32, all: bool) -> Result<()> {
    let tree = open_tree(source).await?;
    let start = path::normalize(start);
    let Some(node) = tree.resolve(&start) else {
        bail!("Path not found: {start}");
    };

    println!("{}", "─".repeat(60));
    println!(
        " {} - {}",
        start,
        match tree.version.as_deref() {
            Some(version) => format!("version {}", version.chars().take(7).collect::<String>()),
            None => "unversioned".to_string(),
        }
    );
    println!(
        " {} files, {} directories, {}",
        tree.stats.total_files,
        tree.stats.total_dirs,
        format_size(tree.stats.total_size)
    );
    if tree.has_warnings() {
        println!(" {} manifest warning(s)", tree.warnings.len());
    }
    println!("{}", "─".repeat(60));

    print_node(&tree, node, 0, max_depth, all);
    Ok(())
}

/// Restore a state from an address and print its canonical form.
async fn run_address(source: &Path, input: &str) -> Result<()> {
    let mut session = Session::from_load_result(read_manifest(source).await);
    session.restore_address(input);

    let state = session.state();
    println!("directory: {}", state.current_directory);
    println!("sort:      {}", state.sort_mode);
    println!("hidden:    {}", if state.show_hidden { "on" } else { "off" });
    println!(
        "search:    {}",
        if state.is_searching() {
            state.search_query.as_str()
        } else {
            "-"
        }
    );
    println!("rows:      {}", session.visible_rows().len());
    println!("address:   {}", session.address());
    println!("canonical: {}", address::serialize(state));
    if let Some(status) = session.status() {
        println!("status:    {status}");
    }
    Ok(())
}

/// Drive a session from palette commands read on stdin.
async fn run_browse(
    source: PathBuf,
    initial_address: Option<String>,
    columns: Option<usize>,
    content_root: Option<PathBuf>,
) -> Result<()> {
    if is_stdin(&source) {
        bail!("browse reads commands from stdin; pass a manifest file");
    }

    let settings = UserSettings::load();
    let mut session = Session::from_load_result(load_manifest(&source).await);
    session.configure(&settings, initial_address.as_deref());
    if let Some(columns) = columns {
        session.set_layout(Layout::grid(columns));
    }

    let content_root = content_root
        .or_else(|| settings.content_root.clone())
        .unwrap_or_else(|| {
            source
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });
    let loader = PreviewLoader::new(content_root).with_max_bytes(settings.preview_max_bytes);

    println!("{}", session.index_summary());
    print_view(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = parse_command(&line);
        tracing::debug!(?action, "palette command");
        match action {
            CommandAction::None => {
                if !line.trim().is_empty() {
                    println!("Unknown command. {HELP}");
                }
                continue;
            }
            CommandAction::Quit => break,
            CommandAction::Reload => match load_manifest(&source).await {
                Ok(manifest) => {
                    session.reload(&manifest);
                    println!("{}", session.index_summary());
                }
                Err(err) => println!("Reload failed: {err}"),
            },
            CommandAction::NavigateTo(target) => {
                session.navigate(&resolve_target(session.current_directory(), &target));
            }
            CommandAction::GoToRoot => session.go_to_root(),
            CommandAction::GoToParent => {
                session.go_to_parent();
            }
            CommandAction::Back => {
                if !session.back() {
                    println!("Nothing to go back to");
                }
            }
            CommandAction::Forward => {
                if !session.forward() {
                    println!("Nothing to go forward to");
                }
            }
            CommandAction::ShowHelp => {
                println!("{HELP}");
                continue;
            }
            CommandAction::SetSort(command) => {
                let current = session.state().sort_mode;
                session.set_sort_mode(match command {
                    SortCommand::Set(mode) => mode,
                    SortCommand::Cycle => current.next(),
                    SortCommand::Reverse => current.reverse(),
                });
            }
            CommandAction::SetHidden(Some(show)) => session.set_show_hidden(show),
            CommandAction::SetHidden(None) => session.toggle_hidden(),
            CommandAction::Search(term) => session.set_search(&term),
            CommandAction::ClearSearch => session.clear_search(),
            CommandAction::Move(movement) => {
                session.apply_movement(movement);
            }
            CommandAction::Select(index) => {
                if !session.select(index) {
                    println!("No row {index}");
                }
            }
            CommandAction::Activate => match session.activate_selection() {
                Activation::Nothing => println!("Nothing selected"),
                Activation::Navigated { .. } => {}
                Activation::PreviewRequested(request) => {
                    let content = loader.load_content(&request).await;
                    if session.accept_preview(request.ticket) {
                        print_preview(&content);
                    }
                }
            },
            CommandAction::Rename(label) => {
                let Some(target) = session.selected_node().map(|n| n.path.clone()) else {
                    println!("Nothing selected");
                    continue;
                };
                session.rename_label(&target, label.as_deref());
            }
            CommandAction::ShowAddress => {
                println!("{}", session.address());
                continue;
            }
            CommandAction::GoToAddress(input) => session.restore_address(&input),
            CommandAction::SetView(Some(layout)) => session.set_layout(layout),
            CommandAction::SetView(None) => {
                session.toggle_layout();
            }
            CommandAction::ShowBookmarks => {
                print_bookmarks(&session);
                continue;
            }
            CommandAction::OpenBookmark(key) => {
                session.open_bookmark(&key);
            }
        }
        print_view(&session);
    }

    Ok(())
}

/// Load a manifest from a file, or stdin for `-`.
async fn read_manifest(source: &Path) -> Result<Manifest, ManifestError> {
    if is_stdin(source) {
        load_manifest_stdin().await
    } else {
        load_manifest(source).await
    }
}

/// Load and build a tree, failing loudly for the one-shot commands.
async fn open_tree(source: &Path) -> Result<VirtualTree> {
    let manifest = read_manifest(source)
        .await
        .with_context(|| format!("Cannot load {}", source.display()))?;
    Ok(build_tree(&manifest))
}

/// Exclusion for an output file written inside the walked root.
fn output_exclusion(root: &Path, output: &Path) -> Option<String> {
    let relative = output.strip_prefix(root).ok()?;
    Some(literal_pattern(&relative.to_string_lossy().replace('\\', "/")))
}

fn is_stdin(source: &Path) -> bool {
    source.as_os_str() == "-"
}

/// Targets without a leading slash are relative to the current directory.
fn resolve_target(current: &str, target: &str) -> String {
    let base = if target.starts_with('/') { path::ROOT } else { current };
    let mut parts: Vec<&str> = path::segments(base).collect();
    for segment in path::segments(target) {
        match segment {
            "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
    path::join(parts)
}

/// Print breadcrumbs, rows, status and address for the current view.
fn print_view(session: &Session) {
    println!();
    println!("{}", session.breadcrumb_line());

    let rows = session.visible_rows();
    let selected = session.selection();
    if rows.is_empty() {
        println!(
            "  {}",
            if session.state().is_searching() {
                "No matches"
            } else {
                "Empty folder"
            }
        );
    }

    match session.layout() {
        Layout::List => {
            for (index, node) in rows.iter().enumerate() {
                let marker = if selected == Some(index) { '>' } else { ' ' };
                let label = if session.state().is_searching() {
                    node.path.clone()
                } else {
                    node.display_name().to_string()
                };
                println!("{marker} {index:>3} {}", format_row(node, &label));
            }
        }
        Layout::Grid { columns } => {
            for (line, chunk) in rows.chunks(columns.max(1)).enumerate() {
                let cells: Vec<String> = chunk
                    .iter()
                    .enumerate()
                    .map(|(offset, node)| {
                        let index = line * columns.max(1) + offset;
                        let marker = if selected == Some(index) { '>' } else { ' ' };
                        let dir_marker = if node.is_dir { "/" } else { "" };
                        format!(
                            "{marker}{:<24}",
                            truncate(&format!("{}{}", node.display_name(), dir_marker), 24)
                        )
                    })
                    .collect();
                println!("{}", cells.join(" "));
            }
        }
    }

    println!("{}", session.status_line());
    println!("{}", session.address());
}

fn print_bookmarks(session: &Session) {
    if session.bookmarks().is_empty() {
        println!("No bookmarks. Add [[bookmarks]] entries to the settings file.");
        return;
    }
    for (number, bookmark) in session.bookmarks().iter().enumerate() {
        println!("{:>3} {:<24} {}", number + 1, truncate(&bookmark.label, 24), bookmark.path);
    }
}

fn print_preview(content: &PreviewContent) {
    println!("{}", "─".repeat(60));
    match content {
        PreviewContent::Text { text, .. } => {
            for line in text.lines().take(40) {
                println!("{line}");
            }
            let total = text.lines().count();
            if total > 40 {
                println!("... {} more line(s)", total - 40);
            }
        }
        other => println!("{}", other.summary()),
    }
    println!("open: {}", content.reference());
    println!("{}", "─".repeat(60));
}

/// One printable listing row.
fn format_row(node: &Node, label: &str) -> String {
    let dir_marker = if node.is_dir { "/" } else { "" };
    let size = if node.is_dir {
        format!("{} item(s)", node.child_count())
    } else {
        format_size(node.size)
    };
    format!(
        "{:<48} {:>12} {:>16} {}",
        truncate(&format!("{label}{dir_marker}"), 48),
        size,
        format_mtime(node.mtime),
        node.kind()
    )
}

/// Print a node and its visible children recursively.
fn print_node(tree: &VirtualTree, node: &Node, depth: u32, max_depth: u32, all: bool) {
    let indent = "  ".repeat(depth as usize);
    let name = if node.is_root() {
        "/".to_string()
    } else {
        node.display_name().to_string()
    };
    let dir_marker = if node.is_dir && !node.is_root() { "/" } else { "" };

    println!(
        "{}{}{:<40} {:>10}",
        indent,
        if node.is_dir { "▼ " } else { "  " },
        truncate(&format!("{name}{dir_marker}"), 40),
        if node.is_dir {
            String::new()
        } else {
            format_size(node.size)
        },
    );

    if !node.is_dir {
        return;
    }

    let view = ViewSpec {
        show_hidden: all,
        ..ViewSpec::listing(&node.path)
    };
    let children = visible_rows(tree, &view);
    if depth >= max_depth {
        if !children.is_empty() {
            println!("{}    ... {} item(s)", indent, children.len());
        }
        return;
    }
    for child in children {
        print_node(tree, child, depth + 1, max_depth, all);
    }
}

/// Format bytes as human-readable size.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format an epoch-millisecond time, or a dash when unknown.
fn format_mtime(mtime: Option<i64>) -> String {
    mtime
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate a string to fit within max_len characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
