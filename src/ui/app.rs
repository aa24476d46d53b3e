use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use fluent_bundle::FluentArgs;
use gtk4::gdk::Display;
use gtk4::gio::{Menu, SimpleAction};
use gtk4::prelude::*;
use gtk4::{
    Application, ApplicationWindow, AspectFrame, Box as GtkBox, CssProvider, DrawingArea,
    HeaderBar, Label, MenuButton, Orientation, Separator, STYLE_PROVIDER_PRIORITY_APPLICATION,
};
use tracing::debug;

use super::board::{self, ViewState};
use super::dialogs;
use super::rendering;
use super::resources::GameResources;
use crate::game::logic::{ClickResult, GameState};
use crate::game::types::CandyKind;
use crate::i18n::I18n;

const CSS: &str = "
    .title-label  { font-weight: 700; font-size: 15px; }
    .score-label  { font-weight: 700; font-size: 16px; }
    .target-label { font-size: 14px; color: #c01c28; }
    .stat-label   { font-size: 14px; margin: 0 6px; }
    .guide-label  { font-size: 12px; margin: 0 4px; }
    .game-board   { background-color: #2d2d2d; }
    .game-over-label { font-size: 16px; }
";

struct StatusBar {
    score: Label,
    target: Label,
    moves: Label,
}

impl StatusBar {
    fn build(container: &GtkBox) -> Self {
        let score = Label::new(None);
        score.add_css_class("score-label");
        let target = Label::new(None);
        target.add_css_class("target-label");
        let moves = Label::new(None);
        moves.add_css_class("stat-label");

        container.append(&score);
        container.append(&Separator::new(Orientation::Vertical));
        container.append(&target);
        container.append(&Separator::new(Orientation::Vertical));
        container.append(&moves);
        container.append(&Separator::new(Orientation::Vertical));

        // Points guide
        for kind in CandyKind::ALL {
            let guide = Label::new(Some(&format!("{}: {}", kind.symbol(), kind.points())));
            guide.add_css_class("guide-label");
            container.append(&guide);
        }

        Self {
            score,
            target,
            moves,
        }
    }

    fn update(&self, state: &GameState, i18n: &I18n) {
        let snap = state.snapshot();
        let mut args = FluentArgs::new();
        args.set("score", snap.score);
        self.score.set_text(&i18n.t_args("status-score", &args));

        let mut args = FluentArgs::new();
        args.set("target", snap.target_score);
        self.target.set_text(&i18n.t_args("status-target", &args));

        let mut args = FluentArgs::new();
        args.set("moves", snap.moves_left);
        self.moves.set_text(&i18n.t_args("status-moves", &args));
    }
}

/// Build and present the main application window.
pub fn build_ui(app: &Application, resources_dir: &str) {
    // ── Shared state ──
    let state = Rc::new(RefCell::new(GameState::new()));
    let resources = Rc::new(GameResources::load(resources_dir));
    let i18n = Rc::new(I18n::load_from_dir(resources_dir));
    let view = Rc::new(RefCell::new(ViewState::new()));

    // ── CSS ──
    let provider = CssProvider::new();
    provider.load_from_data(CSS);
    if let Some(display) = Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }

    let (ref_w, ref_h) = {
        let st = state.borrow();
        rendering::ref_size(st.board().rows(), st.board().cols())
    };

    // ── Window ──
    let window = ApplicationWindow::builder()
        .application(app)
        .title(i18n.t("app-title"))
        .default_width(ref_w as i32 + 120)
        .default_height(ref_h as i32 + 90)
        .resizable(true)
        .build();

    // ── Header bar ──
    let header = HeaderBar::new();
    header.set_show_title_buttons(true);
    let header_title = Label::new(Some(&i18n.t("app-title")));
    header_title.add_css_class("title-label");
    header.set_title_widget(Some(&header_title));

    // ── Hamburger menu ──
    let menu = Menu::new();
    menu.append(Some(&i18n.t("menu-new-game")), Some("win.new-game"));
    menu.append(Some(&i18n.t("menu-hint")), Some("win.hint"));
    let section2 = Menu::new();
    section2.append(Some(&i18n.t("menu-info")), Some("win.info"));
    menu.append_section(None, &section2);

    let menu_button = MenuButton::new();
    menu_button.set_icon_name("open-menu-symbolic");
    menu_button.set_menu_model(Some(&menu));
    header.pack_end(&menu_button);

    // ── Main layout ──
    let main_box = GtkBox::new(Orientation::Vertical, 0);

    let status_box = GtkBox::new(Orientation::Horizontal, 8);
    status_box.set_halign(gtk4::Align::Center);
    status_box.set_margin_start(8);
    status_box.set_margin_end(8);
    status_box.set_margin_top(8);
    status_box.set_margin_bottom(8);
    let status = Rc::new(StatusBar::build(&status_box));
    status.update(&state.borrow(), &i18n);
    main_box.append(&status_box);

    // Clears the board effects and starts a fresh round.
    let reset_game: Rc<dyn Fn(&DrawingArea)> = {
        let state = state.clone();
        let view = view.clone();
        let status = status.clone();
        let i18n = i18n.clone();
        Rc::new(move |da: &DrawingArea| {
            state.borrow_mut().reset();
            view.borrow_mut().clear();
            status.update(&state.borrow(), &i18n);
            da.queue_draw();
        })
    };

    let on_click: Rc<dyn Fn(&DrawingArea, &ClickResult)> = {
        let state = state.clone();
        let status = status.clone();
        let i18n = i18n.clone();
        let window = window.clone();
        let reset_game = reset_game.clone();
        Rc::new(move |da: &DrawingArea, result: &ClickResult| {
            status.update(&state.borrow(), &i18n);
            if let ClickResult::Matched { outcome, .. } = result {
                if outcome.is_terminal() {
                    let (score, target) = {
                        let st = state.borrow();
                        (st.score(), st.target_score())
                    };
                    let da = da.clone();
                    let reset_game = reset_game.clone();
                    dialogs::show_game_over(&window, &i18n, *outcome, score, target, move || {
                        reset_game(&da)
                    });
                }
            }
        })
    };

    let drawing_area = board::create_board(state.clone(), resources, view.clone(), on_click);
    drawing_area.add_css_class("game-board");
    let aspect_frame = AspectFrame::new(0.5, 0.5, (ref_w / ref_h) as f32, false);
    aspect_frame.set_child(Some(&drawing_area));
    aspect_frame.set_hexpand(true);
    aspect_frame.set_vexpand(true);
    main_box.append(&aspect_frame);

    // ── Effects tick (time-based) ──
    {
        let view = view.clone();
        let last_time = Rc::new(RefCell::new(Instant::now()));
        drawing_area.add_tick_callback(move |widget, _clock| {
            let now = Instant::now();
            let dt = now.duration_since(last_time.replace(now));
            if view.borrow_mut().tick(dt) {
                widget.queue_draw();
            }
            glib::Continue(true)
        });
    }

    // ── Actions ──
    // New Game
    {
        let action = SimpleAction::new("new-game", None);
        let state = state.clone();
        let i18n = i18n.clone();
        let win_for_closure = window.clone();
        let drawing_area = drawing_area.clone();
        action.connect_activate(move |_, _| {
            let st = state.borrow();
            let running = !st.outcome().is_terminal() && st.has_progress();
            drop(st);
            if running {
                let drawing_area = drawing_area.clone();
                let reset_game = reset_game.clone();
                dialogs::confirm(
                    &win_for_closure,
                    &i18n,
                    "new-game-title",
                    "new-game-message",
                    move || reset_game(&drawing_area),
                );
            } else {
                reset_game(&drawing_area);
            }
        });
        window.add_action(&action);
    }

    // Hint
    {
        let action = SimpleAction::new("hint", None);
        let state = state.clone();
        let i18n = i18n.clone();
        let win_for_closure = window.clone();
        let drawing_area = drawing_area.clone();
        action.connect_activate(move |_, _| {
            let mut st = state.borrow_mut();
            if st.outcome().is_terminal() {
                return;
            }
            let tip = st.hint();
            drop(st);
            debug!(?tip, "hint requested");
            if tip.is_none() {
                dialogs::show_info(
                    &win_for_closure,
                    &i18n.t("menu-hint"),
                    &i18n.t("no-hint"),
                    &i18n,
                );
            }
            drawing_area.queue_draw();
        });
        window.add_action(&action);
    }

    // Info
    {
        let action = SimpleAction::new("info", None);
        let win_for_closure = window.clone();
        let i18n = i18n.clone();
        action.connect_activate(move |_, _| {
            let mut args = FluentArgs::new();
            args.set("version", env!("CARGO_PKG_VERSION"));
            let body = i18n.t_args("info-body", &args);
            dialogs::show_info(&win_for_closure, &i18n.t("menu-info"), &body, &i18n);
        });
        window.add_action(&action);
    }

    // ── Close-request handler (warn if game in progress) ──
    {
        let state = state.clone();
        let i18n = i18n.clone();
        window.connect_close_request(move |win| {
            let st = state.borrow();
            if !st.outcome().is_terminal() && st.has_progress() {
                drop(st);
                let target = win.clone();
                dialogs::confirm(
                    win,
                    &i18n,
                    "close-confirm-title",
                    "close-confirm-message",
                    move || target.destroy(),
                );
                gtk4::Inhibit(true)
            } else {
                gtk4::Inhibit(false)
            }
        });
    }

    window.set_titlebar(Some(&header));
    window.set_child(Some(&main_box));
    window.present();
}
