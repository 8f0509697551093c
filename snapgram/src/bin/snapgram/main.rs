mod commands;
mod context;
mod examples;
mod output;
mod theme;
mod views;

use std::fmt::Write;
use std::io::{self, Write as IoWrite};
use std::path::PathBuf;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
    error::ErrorKind,
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use snapgram::{DocumentStore, config::DEFAULT_CONFIG_FILE};

use commands::{
    chat::{ChatCommands, handle_chat_commands},
    doctor::handle_doctor,
    graph::{RequestCommands, handle_follow, handle_request_commands, handle_unfollow},
    notifications::{NotificationCommands, SettingsCommands, handle_notification_commands, handle_settings_commands},
    posts::{BookmarkCommands, PostCommands, handle_bookmark_commands, handle_comment, handle_like, handle_post_commands},
    profile::{ProfileCommands, handle_profile_commands},
    tour::handle_tour,
};
use context::{AppContext, load_settings};
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("REDIS_URL", "Redis connection URL (default redis://127.0.0.1/)"),
    ("SNAPGRAM_USER", "Acting user id, same as --as"),
    ("RUST_LOG", "Log filter, e.g. snapgram=debug"),
];

#[derive(Parser)]
#[command(name = "snapgram")]
#[command(version)]
#[command(
    about = "Social graph, notification and messaging rules for Snapgram",
    long_about = r#"Command-line access to the Snapgram social rules layer:

• Follow graph with private accounts and follow requests
• Likes, comments and bookmarks on photo posts
• Notifications gated by each user's settings
• Direct messages with unread counters

Commands act as the user given with --as (or SNAPGRAM_USER) against Redis,
or against a throwaway in-memory store with --memory.
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Act as this user
    #[arg(long = "as", env = "SNAPGRAM_USER", global = true)]
    acting_user: Option<String>,

    /// Use an empty in-memory store instead of Redis
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn parse_with_styles() -> Self {
        let command = build_cli_command();
        match command.styles(help_styles()).try_get_matches() {
            Ok(matches) => Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit()),
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = print_blank_line_stdout();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display help: {print_err}");
                    }
                    let _ = print_blank_line_stdout();
                    std::process::exit(0);
                }
                ErrorKind::MissingSubcommand => {
                    handle_missing_subcommand(err);
                }
                _ => {
                    let exit_code = err.exit_code();
                    let _ = print_blank_line_stderr();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display error: {print_err}");
                    }
                    let _ = print_blank_line_stderr();
                    std::process::exit(exit_code);
                }
            },
        }
    }
}

fn handle_missing_subcommand(error: clap::error::Error) -> ! {
    let mut command = build_cli_command();
    let command_name = command
        .get_display_name()
        .unwrap_or_else(|| command.get_name())
        .to_string();

    let _ = print_blank_line_stderr();
    eprintln!("error: '{command_name}' requires a subcommand but one was not provided");
    let _ = print_blank_line_stderr();

    command = command.styles(help_styles());

    let mut stderr = io::stderr();
    if command.write_long_help(&mut stderr).is_ok() {
        let _ = IoWrite::write_all(&mut stderr, b"\n");
        let _ = IoWrite::flush(&mut stderr);
    }

    let _ = print_blank_line_stderr();
    std::process::exit(error.exit_code());
}

fn build_cli_command() -> Command {
    let use_color = detect_color_support();
    let appendix = render_top_level_appendix(use_color);
    let mut command = Cli::command().after_long_help(appendix);
    command = command.color(if use_color { ColorChoice::Auto } else { ColorChoice::Never });
    attach_command_examples(&mut command, use_color);
    command
}

fn attach_command_examples(command: &mut Command, use_color: bool) {
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            let help_text = render_examples(example.groups, use_color);
            *subcommand = subcommand.clone().after_long_help(help_text);
        }
    }
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let heading = stylize("Examples:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{heading}");

    for (index, group) in groups.iter().enumerate() {
        let title = stylize(group.title, theme.primary, true, use_color);
        let _ = writeln!(buffer, "  {title}");

        for command in group.commands {
            let arrow = stylize(ICONS.arrow, theme.secondary, false, use_color);
            let command_text = stylize(command, theme.secondary, false, use_color);
            let _ = writeln!(buffer, "    {arrow} {command_text}");
        }

        if index + 1 < groups.len() {
            buffer.push('\n');
        }
    }

    if !buffer.ends_with('\n') {
        buffer.push('\n');
    }

    buffer
}

fn render_top_level_appendix(use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let env_heading = stylize("Environment Variables:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{env_heading}");
    for (key, description) in ENVIRONMENT_VARIABLES {
        let key_text = stylize(key, theme.key, true, use_color);
        let value_text = stylize(description, theme.value, false, use_color);
        let _ = writeln!(buffer, "  {key_text}  {value_text}");
    }

    buffer.push('\n');

    let tip_heading = stylize("Tip:", theme.highlight, true, use_color);
    let tip_text = stylize(
        "Try 'snapgram --memory tour' for a walkthrough that needs no Redis.",
        theme.secondary,
        false,
        use_color,
    );
    let _ = writeln!(buffer, "{tip_heading} {tip_text}");

    buffer
}

fn print_blank_line_stdout() -> io::Result<()> {
    let mut stdout = io::stdout();
    IoWrite::write_all(&mut stdout, b"\n")?;
    IoWrite::flush(&mut stdout)
}

fn print_blank_line_stderr() -> io::Result<()> {
    let mut stderr = io::stderr();
    IoWrite::write_all(&mut stderr, b"\n")?;
    IoWrite::flush(&mut stderr)
}

fn stylize(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    if use_color {
        let styled = text.color(color);
        if bold { styled.bold().to_string() } else { styled.to_string() }
    } else {
        text.to_string()
    }
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let theme = &THEME;
    Styles::styled()
        .usage(style_from_color(theme.primary).bold())
        .header(style_from_color(theme.highlight).bold())
        .literal(style_from_color(theme.secondary))
        .placeholder(style_from_color(theme.muted))
        .valid(style_from_color(theme.success))
        .invalid(style_from_color(theme.warning))
        .error(style_from_color(theme.error).bold())
}

fn style_from_color(color: ThemeColor) -> Style {
    Style::new().fg_color(Some(color_to_clap_color(color)))
}

fn color_to_clap_color(color: ThemeColor) -> ClapColor {
    match color {
        ThemeColor::Black => ClapColor::Ansi(AnsiColor::Black),
        ThemeColor::Red => ClapColor::Ansi(AnsiColor::Red),
        ThemeColor::Green => ClapColor::Ansi(AnsiColor::Green),
        ThemeColor::Yellow => ClapColor::Ansi(AnsiColor::Yellow),
        ThemeColor::Blue => ClapColor::Ansi(AnsiColor::Blue),
        ThemeColor::Magenta => ClapColor::Ansi(AnsiColor::Magenta),
        ThemeColor::Cyan => ClapColor::Ansi(AnsiColor::Cyan),
        ThemeColor::White => ClapColor::Ansi(AnsiColor::White),
        ThemeColor::BrightBlack => ClapColor::Ansi(AnsiColor::BrightBlack),
        ThemeColor::BrightRed => ClapColor::Ansi(AnsiColor::BrightRed),
        ThemeColor::BrightGreen => ClapColor::Ansi(AnsiColor::BrightGreen),
        ThemeColor::BrightYellow => ClapColor::Ansi(AnsiColor::BrightYellow),
        ThemeColor::BrightBlue => ClapColor::Ansi(AnsiColor::BrightBlue),
        ThemeColor::BrightMagenta => ClapColor::Ansi(AnsiColor::BrightMagenta),
        ThemeColor::BrightCyan => ClapColor::Ansi(AnsiColor::BrightCyan),
        ThemeColor::BrightWhite => ClapColor::Ansi(AnsiColor::BrightWhite),
        ThemeColor::TrueColor { r, g, b } => ClapColor::Rgb(RgbColor(r, g, b)),
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create, show and edit user profiles
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Follow a user, or send a request if their account is private
    Follow { user_id: String },

    /// Stop following a user
    Unfollow { user_id: String },

    /// Review follow requests and list connections
    #[command(subcommand)]
    Requests(RequestCommands),

    /// Publish and browse posts
    #[command(subcommand)]
    Post(PostCommands),

    /// Like a post (or remove the like with --undo)
    Like {
        post_id: String,
        #[arg(long)]
        undo: bool,
    },

    /// Save posts for later
    #[command(subcommand)]
    Bookmark(BookmarkCommands),

    /// Comment on a post
    Comment { post_id: String, text: String },

    /// Direct messages
    #[command(subcommand)]
    Chat(ChatCommands),

    /// Read and follow the notification feed
    #[command(subcommand)]
    Notifications(NotificationCommands),

    /// Per-category notification preferences
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Report follow, bookmark and like-counter drift
    Doctor,

    /// Walk demo users through every workflow
    Tour,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();

    let _ = print_blank_line_stdout();

    match execute(cli).await {
        Ok(code) => {
            let _ = print_blank_line_stdout();
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            let _ = print_blank_line_stdout();
            std::process::exit(1);
        }
    }
}

async fn execute(cli: Cli) -> Result<i32> {
    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };
    if global_options.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(global_options);
    let settings = load_settings(&cli.config)?;

    if cli.memory {
        output.verbose("using an in-memory store");
        let ctx = AppContext::in_memory(settings, cli.acting_user);
        run(cli.command, &ctx, &output).await
    } else {
        let ctx = AppContext::connect(settings, cli.acting_user).await?;
        run(cli.command, &ctx, &output).await
    }
}

async fn run<S: DocumentStore>(command: Commands, ctx: &AppContext<S>, output: &OutputManager) -> Result<i32> {
    match command {
        Commands::Profile(cmd) => handle_profile_commands(cmd, ctx, output).await?,
        Commands::Follow { user_id } => handle_follow(&user_id, ctx, output).await?,
        Commands::Unfollow { user_id } => handle_unfollow(&user_id, ctx, output).await?,
        Commands::Requests(cmd) => handle_request_commands(cmd, ctx, output).await?,
        Commands::Post(cmd) => handle_post_commands(cmd, ctx, output).await?,
        Commands::Like { post_id, undo } => handle_like(&post_id, undo, ctx, output).await?,
        Commands::Bookmark(cmd) => handle_bookmark_commands(cmd, ctx, output).await?,
        Commands::Comment { post_id, text } => handle_comment(&post_id, &text, ctx, output).await?,
        Commands::Chat(cmd) => handle_chat_commands(cmd, ctx, output).await?,
        Commands::Notifications(cmd) => handle_notification_commands(cmd, ctx, output).await?,
        Commands::Settings(cmd) => handle_settings_commands(cmd, ctx, output).await?,
        Commands::Doctor => {
            if !handle_doctor(ctx, output).await? {
                return Ok(1);
            }
        }
        Commands::Tour => handle_tour(ctx, output).await?,
    }
    Ok(0)
}
