use std::env;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;
use tracing::{info, warn};

use narat::api::Gateway;
use narat::api::transport::default_transport;
use narat::app::{App, ProfileField, SETTINGS_FIELDS, StatusLevel};
use narat::config::{API_BASE_URL_ENV, Config};
use narat::dispatch::ThreadDispatcher;
use narat::event::{AppEvent, EventHandler};
use narat::logging;
use narat::route::Route;
use narat::stats::StatsTab;
use narat::store::SessionStore;
use narat::study::StudyMode;
use narat::ui;
use narat::ui::components::progress_bar::ProgressBar;
use narat::ui::components::question_card::QuestionCard;
use narat::ui::components::question_stats_popup::QuestionStatsPopup;
use narat::ui::components::recommendation_list::RecommendationList;
use narat::ui::components::stats_dashboard::StatsDashboard;
use narat::ui::layout::AppLayout;
use narat::ui::line_input::InputResult;
use narat::ui::theme::Theme;

rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(name = "narat", version, about = "Terminal client for the 나랏말싸미 Korean grammar study service")]
struct Cli {
    #[arg(long, help = "Backend base URL (overrides NARAT_API_BASE_URL and config)")]
    base_url: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Questions per page")]
    page_size: Option<u32>,

    #[arg(short, long, help = "Study mode (choice, typed)")]
    mode: Option<String>,

    #[arg(long, help = "UI language (ko, en)")]
    locale: Option<String>,

    #[arg(long, help = "Log filter, e.g. narat=debug")]
    log_level: Option<String>,

    #[arg(long, help = "Google OAuth access token to sign in with on start")]
    access_token: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    config.apply_base_url_override(env::var(API_BASE_URL_ENV).ok());
    config.apply_base_url_override(cli.base_url.clone());
    if let Some(size) = cli.page_size {
        config.page_size = size;
    }
    if let Some(mode) = cli.mode.as_deref() {
        config.study_mode = match mode {
            "choice" => StudyMode::Choice,
            "typed" => StudyMode::Typed,
            other => bail!("unknown study mode '{other}' (expected choice or typed)"),
        };
    }
    if let Some(locale) = cli.locale.clone() {
        config.locale = locale;
    }
    if let Some(theme) = cli.theme.clone() {
        config.theme = theme;
    }
    config.validate();

    let directive = logging::filter_directive(
        env::var("RUST_LOG").ok(),
        cli.log_level.as_deref(),
        &config.log_filter,
    );
    if let Err(e) = logging::init(&logging::log_dir(), &directive) {
        eprintln!("logging disabled: {e}");
    }
    rust_i18n::set_locale(&config.locale);
    info!(base_url = %config.api_base_url, locale = %config.locale, "starting");

    let theme = Theme::load(&config.theme).unwrap_or_default().leak();
    let events = EventHandler::new(Duration::from_millis(100));

    let store = SessionStore::new()?;
    let transport = default_transport(config.request_timeout())?;
    let rejected_tx = events.sender();
    let gateway = Gateway::new(
        config.api_base_url.clone(),
        transport,
        store.clone(),
        config.correctness_encoding,
    )
    .with_unauthorized_hook(Box::new(move |token| {
        let _ = rejected_tx.send(AppEvent::SessionRejected(token.map(str::to_string)));
    }));
    let dispatcher = ThreadDispatcher::new(Arc::new(gateway), events.sender());

    let mut app = App::with_parts(config, store, Box::new(dispatcher), theme);
    app.start(cli.access_token.as_deref());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        warn!(error = %err, "event loop failed");
        eprintln!("Error: {err:?}");
    }
    info!("exiting");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Api(reply) => app.handle_reply(reply),
            AppEvent::SessionRejected(token) => app.handle_session_rejected(token),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Only process Press events; Repeat and Release would double input
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.route {
        Route::Home => handle_home_key(app, key),
        Route::Login => handle_login_key(app, key),
        Route::Study => handle_study_key(app, key),
        Route::Statistics => handle_stats_key(app, key),
        Route::Recommendations => handle_recommendations_key(app, key),
        Route::Profile => handle_profile_key(app, key),
        Route::Settings => handle_settings_key(app, key),
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(action) = app.menu.selected_action() {
                app.menu_action(action);
            }
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                app.menu_action(action);
            } else if ch == 'q' {
                app.should_quit = true;
            }
        }
        KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    if app.is_login_pending() {
        if key.code == KeyCode::Esc {
            app.navigate(Route::Home);
        }
        return;
    }
    match app.login_input.handle(key) {
        InputResult::Submit => {
            let token = app.login_input.value().to_string();
            app.submit_login(&token);
        }
        InputResult::Cancel => app.navigate(Route::Home),
        _ => {}
    }
}

fn handle_study_key(app: &mut App, key: KeyEvent) {
    if app.question_stats.open {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('i') | KeyCode::Char('q')) {
            app.question_stats.close();
        }
        return;
    }

    let typing = app.config.study_mode == StudyMode::Typed
        && app.study.current().is_some()
        && app.study.feedback().is_none()
        && !app.study.is_submitting();
    if typing {
        match app.answer_input.handle(key) {
            InputResult::Submit => app.submit_answer(),
            InputResult::Cancel => app.navigate(Route::Home),
            InputResult::FocusNext => app.next_question(),
            InputResult::FocusPrev => app.previous_question(),
            InputResult::Continue => {}
        }
        return;
    }

    let answered = app.study.feedback().is_some();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.navigate(Route::Home),
        KeyCode::Up | KeyCode::Char('k') => app.select_option(-1),
        KeyCode::Down | KeyCode::Char('j') => app.select_option(1),
        KeyCode::Char(ch @ '1'..='9') if !answered => {
            let index = ch as usize - '1' as usize;
            if index < app.study.options().len() {
                app.selected_option = index;
                app.submit_answer();
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if answered {
                app.next_question();
            } else if !app.study.is_submitting() {
                app.submit_answer();
            }
        }
        KeyCode::Right | KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Tab => {
            app.next_question()
        }
        KeyCode::Left | KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::BackTab => {
            app.previous_question()
        }
        KeyCode::Char('i') => app.open_question_stats(),
        KeyCode::Char('m') => app.toggle_study_mode(),
        KeyCode::Char('r') => app.retry_study(),
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.navigate(Route::Home),
        KeyCode::Char('1') => app.stats.tab = StatsTab::Overview,
        KeyCode::Char('2') => app.stats.tab = StatsTab::Progress,
        KeyCode::Char('3') => app.stats.tab = StatsTab::History,
        KeyCode::Tab => app.stats.tab = app.stats.tab.next(),
        KeyCode::BackTab => app.stats.tab = app.stats.tab.prev(),
        KeyCode::Char('j') | KeyCode::Down if app.stats.tab == StatsTab::History => {
            app.stats.select_next()
        }
        KeyCode::Char('k') | KeyCode::Up if app.stats.tab == StatsTab::History => {
            app.stats.select_prev()
        }
        KeyCode::Char('r') => app.load_statistics(),
        _ => {}
    }
}

fn handle_recommendations_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.navigate(Route::Home),
        KeyCode::Char('r') => app.request_recommendations(),
        KeyCode::Up | KeyCode::Char('k') => app.select_recommendation(-1),
        KeyCode::Down | KeyCode::Char('j') => app.select_recommendation(1),
        KeyCode::Enter => app.solve_selected_recommendation(),
        _ => {}
    }
}

fn handle_profile_key(app: &mut App, key: KeyEvent) {
    if app.auth.profile_pending() {
        if key.code == KeyCode::Esc {
            app.navigate(Route::Home);
        }
        return;
    }
    let form = &mut app.profile;
    let result = match form.focus {
        ProfileField::Name => form.name.handle(key),
        ProfileField::Age => form.age.handle(key),
        ProfileField::Gender => match key.code {
            KeyCode::Esc => InputResult::Cancel,
            KeyCode::Enter => InputResult::Submit,
            KeyCode::Tab | KeyCode::Down => InputResult::FocusNext,
            KeyCode::BackTab | KeyCode::Up => InputResult::FocusPrev,
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                form.cycle_gender();
                InputResult::Continue
            }
            _ => InputResult::Continue,
        },
    };
    match result {
        InputResult::Submit => app.submit_profile(),
        InputResult::Cancel => app.navigate(Route::Home),
        InputResult::FocusNext => app.profile.focus = app.profile.focus.next(),
        InputResult::FocusPrev => app.profile.focus = app.profile.focus.prev(),
        InputResult::Continue => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.navigate(Route::Home);
            app.save_settings();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < SETTINGS_FIELDS {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle(false),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);

    match app.route {
        Route::Home => render_home(frame, app, &layout),
        Route::Login => render_login(frame, app, &layout),
        Route::Study => render_study(frame, app, &layout),
        Route::Statistics => {
            let main = layout.sidebar.map_or(layout.main, |s| layout.main.union(s));
            let dashboard = StatsDashboard::new(&app.stats, app.config.correctness_encoding, app.theme);
            frame.render_widget(dashboard, main);
        }
        Route::Recommendations => {
            let main = layout.sidebar.map_or(layout.main, |s| layout.main.union(s));
            frame.render_widget(RecommendationList::new(&app.poller, app.rec_selected, app.theme), main);
        }
        Route::Profile => render_profile(frame, app, &layout),
        Route::Settings => render_settings(frame, app, &layout),
    }

    render_footer(frame, app, layout.footer);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let base = Style::default().fg(colors.header_fg()).bg(colors.header_bg());

    let mut spans = vec![
        Span::styled(" 나랏말싸미 ", base.add_modifier(Modifier::BOLD)),
        Span::styled(format!("| {} ", app.route.title()), base),
    ];
    if app.route == Route::Study {
        let (correct, attempted) = app.study.tally();
        spans.push(Span::styled(
            format!(
                "| {} | {} ",
                t!("study.tally", correct = correct, attempted = attempted),
                app.config.study_mode.label()
            ),
            base.fg(colors.highlight()),
        ));
    }
    if let Some(user) = app.auth.user() {
        spans.push(Span::styled(
            format!("| {} ({}) ", user.display_name, user.study_level.label()),
            base.fg(colors.accent()),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn footer_hints(app: &App) -> Vec<String> {
    let hints = match app.route {
        Route::Home => vec![t!("hint.menu_move"), t!("hint.menu_select"), t!("hint.quit")],
        Route::Login => vec![t!("hint.login_submit"), t!("hint.back")],
        Route::Study if app.question_stats.open => vec![t!("hint.close")],
        Route::Study => vec![
            t!("hint.study_answer"),
            t!("hint.study_move"),
            t!("hint.study_stats"),
            t!("hint.study_mode"),
            t!("hint.retry"),
            t!("hint.back"),
        ],
        Route::Statistics => vec![t!("hint.tabs"), t!("hint.rows"), t!("hint.retry"), t!("hint.back")],
        Route::Recommendations => vec![
            t!("hint.rows"),
            t!("hint.recs_solve"),
            t!("hint.recs_refresh"),
            t!("hint.back"),
        ],
        Route::Profile => vec![t!("hint.fields"), t!("hint.profile_save"), t!("hint.back")],
        Route::Settings => vec![t!("hint.settings_change"), t!("hint.settings_save")],
    };
    hints.into_iter().map(|h| h.into_owned()).collect()
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let hints = footer_hints(app);
    let hint_refs: Vec<&str> = hints.iter().map(String::as_str).collect();
    let packed = ui::layout::pack_hint_lines(&hint_refs, area.width as usize);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        let color = match status.level {
            StatusLevel::Info => colors.accent(),
            StatusLevel::Warn => colors.warning(),
            StatusLevel::Error => colors.error(),
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color),
        )));
    }
    lines.extend(
        packed
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted())))),
    );
    lines.truncate(area.height as usize);
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_home(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let main = layout.sidebar.map_or(layout.main, |s| layout.main.union(s));
    let menu_area = ui::layout::centered_rect(50, 90, main);
    frame.render_widget(&app.menu, menu_area);
}

fn render_login(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let main = layout.sidebar.map_or(layout.main, |s| layout.main.union(s));
    let centered = ui::layout::centered_rect(60, 60, main);

    let block = Block::bordered()
        .title(format!(" {} ", t!("route.login")))
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            t!("login.instructions").into_owned(),
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        Line::from(
            [
                vec![Span::styled(
                    format!(" {} ", t!("login.token_label")),
                    Style::default().fg(colors.muted()),
                )],
                app.login_input.line(colors, !app.is_login_pending()).spans,
            ]
            .concat(),
        ),
        Line::from(""),
    ];
    if app.is_login_pending() {
        lines.push(Line::from(Span::styled(
            t!("login.pending").into_owned(),
            Style::default().fg(colors.muted()),
        )));
    }
    if let Some(error) = &app.login_error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(colors.error()),
        )));
    }
    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(inner, frame.buffer_mut());
}

fn render_study(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let flow = &app.study;
    let area = frame.area();

    let show_progress = layout.tier.show_progress_bar(area.height) && !flow.questions().is_empty();
    let mut constraints = vec![Constraint::Min(6)];
    if show_progress {
        constraints.insert(0, Constraint::Length(3));
    }
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(layout.main);
    let card_area = main_layout[main_layout.len() - 1];

    if show_progress {
        let position = flow.index() + 1;
        let count = flow.questions().len();
        let ratio = position as f64 / count as f64;
        let label = t!("study.page_label", page = flow.page(), total = flow.total());
        let caption = t!(
            "study.progress",
            current = position,
            count = count,
            percent = format!("{:.0}", ratio * 100.0)
        );
        frame.render_widget(
            ProgressBar::new(&label, ratio, app.theme).caption(caption.into_owned()),
            main_layout[0],
        );
    }

    match flow.current() {
        Some(question) => {
            let card = QuestionCard {
                question,
                mode: app.config.study_mode,
                options: flow.options(),
                selected: app.selected_option,
                input: &app.answer_input,
                feedback: flow.feedback(),
                submitting: flow.is_submitting(),
                theme: app.theme,
            };
            frame.render_widget(card, card_area);
            if let Some(error) = flow.error() {
                let row = Rect::new(
                    card_area.x + 2,
                    card_area.bottom().saturating_sub(2),
                    card_area.width.saturating_sub(4),
                    1,
                );
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("{} [{}]", error.user_message(), error.code()),
                        Style::default().fg(colors.error()),
                    )),
                    row,
                );
            }
        }
        None => {
            let (text, color) = match flow.error() {
                _ if flow.is_loading() => (t!("common.loading").into_owned(), colors.muted()),
                Some(e) => (
                    format!("{} [{}]  {}", e.user_message(), e.code(), t!("common.retry_hint")),
                    colors.error(),
                ),
                None => (t!("study.no_questions").into_owned(), colors.muted()),
            };
            let block = Block::bordered().border_style(Style::default().fg(colors.border()));
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
                    .wrap(Wrap { trim: true })
                    .block(block),
                card_area,
            );
        }
    }

    if let Some(sidebar) = layout.sidebar {
        render_study_sidebar(frame, app, sidebar);
    }

    if app.question_stats.open {
        let popup = ui::layout::centered_rect(70, 70, area);
        frame.render_widget(
            QuestionStatsPopup {
                view: &app.question_stats,
                theme: app.theme,
            },
            popup,
        );
    }
}

fn render_study_sidebar(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let block = Block::bordered()
        .title(format!(" {} ", t!("study.recent")))
        .border_style(Style::default().fg(colors.border()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = app
        .study
        .history()
        .iter()
        .take(inner.height as usize)
        .map(|item| {
            let (mark, color) = if item.is_correct {
                ("O", colors.success())
            } else {
                ("X", colors.error())
            };
            Line::from(vec![
                Span::styled(format!(" {mark} "), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(format!("#{:<6}", item.question_id), Style::default().fg(colors.fg())),
                Span::styled(
                    narat::stats::format_duration(item.time_spent),
                    Style::default().fg(colors.muted()),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_profile(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let main = layout.sidebar.map_or(layout.main, |s| layout.main.union(s));
    let centered = ui::layout::centered_rect(60, 70, main);

    let block = Block::bordered()
        .title(format!(" {} ", t!("route.profile")))
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let form = &app.profile;
    let label_style = |focused: bool| {
        Style::default()
            .fg(if focused { colors.accent() } else { colors.fg() })
            .add_modifier(if focused { Modifier::BOLD } else { Modifier::empty() })
    };
    let indicator = |focused: bool| if focused { " > " } else { "   " };

    let mut lines = Vec::new();
    if let Some(user) = app.auth.user() {
        if !user.email.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("   {}", user.email),
                Style::default().fg(colors.muted()),
            )));
        }
        lines.push(Line::from(Span::styled(
            format!("   {}: {}", t!("stats.level"), user.study_level.label()),
            Style::default().fg(colors.muted()),
        )));
        lines.push(Line::from(""));
    }

    let name_focused = form.focus == ProfileField::Name;
    lines.push(Line::from(Span::styled(
        format!("{}{}:", indicator(name_focused), t!("profile.name")),
        label_style(name_focused),
    )));
    lines.push(Line::from(
        [vec![Span::raw("     ")], form.name.line(colors, name_focused).spans].concat(),
    ));
    lines.push(Line::from(""));

    let gender_focused = form.focus == ProfileField::Gender;
    let gender = form
        .gender
        .map(|g| g.label())
        .unwrap_or_else(|| t!("profile.gender_unset").into_owned());
    lines.push(Line::from(Span::styled(
        format!("{}{}:", indicator(gender_focused), t!("profile.gender")),
        label_style(gender_focused),
    )));
    lines.push(Line::from(Span::styled(
        format!("     < {gender} >"),
        Style::default().fg(if gender_focused { colors.highlight() } else { colors.muted() }),
    )));
    lines.push(Line::from(""));

    let age_focused = form.focus == ProfileField::Age;
    lines.push(Line::from(Span::styled(
        format!("{}{}:", indicator(age_focused), t!("profile.age")),
        label_style(age_focused),
    )));
    lines.push(Line::from(
        [vec![Span::raw("     ")], form.age.line(colors, age_focused).spans].concat(),
    ));
    lines.push(Line::from(""));

    if app.auth.profile_pending() {
        lines.push(Line::from(Span::styled(
            t!("common.saving").into_owned(),
            Style::default().fg(colors.muted()),
        )));
    }
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("   {error}"),
            Style::default().fg(colors.error()),
        )));
    }
    Paragraph::new(lines).render(inner, frame.buffer_mut());
}

fn render_settings(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let main = layout.sidebar.map_or(layout.main, |s| layout.main.union(s));
    let centered = ui::layout::centered_rect(60, 80, main);

    let block = Block::bordered()
        .title(format!(" {} ", t!("route.settings")))
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields: Vec<(String, String)> = vec![
        (t!("settings.theme").into_owned(), app.config.theme.clone()),
        (t!("settings.page_size").into_owned(), app.config.page_size.to_string()),
        (t!("settings.mode").into_owned(), app.config.study_mode.label()),
        (t!("settings.locale").into_owned(), app.config.locale.clone()),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
        ])
        .split(inner);

    let server = Paragraph::new(Line::from(Span::styled(
        format!("  {}: {}", t!("settings.server"), app.config.api_base_url),
        Style::default().fg(colors.muted()),
    )));
    server.render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if is_selected {
            colors.highlight()
        } else {
            colors.muted()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }
}
