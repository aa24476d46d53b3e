use fluent_bundle::FluentArgs;
use gtk4::prelude::*;
use gtk4::{ApplicationWindow, Dialog, Label, ResponseType, Widget};

use crate::game::types::GameOutcome;
use crate::i18n::I18n;

fn pad_button(btn: &Widget) {
    btn.set_margin_start(8);
    btn.set_margin_end(8);
    btn.set_margin_top(6);
    btn.set_margin_bottom(6);
}

fn base_dialog(parent: &ApplicationWindow, title: &str) -> Dialog {
    let dialog = Dialog::new();
    dialog.set_transient_for(Some(parent));
    dialog.set_modal(true);
    dialog.set_destroy_with_parent(true);
    dialog.set_title(Some(title));

    let content = dialog.content_area();
    content.set_spacing(8);
    content.set_margin_start(20);
    content.set_margin_end(20);
    content.set_margin_top(16);
    content.set_margin_bottom(16);
    dialog
}

/// Show the end-of-round dialog. `on_play_again` runs when the player asks
/// for a new round.
pub fn show_game_over(
    parent: &ApplicationWindow,
    i18n: &I18n,
    outcome: GameOutcome,
    score: u32,
    target_score: u32,
    on_play_again: impl Fn() + 'static,
) {
    let won = outcome == GameOutcome::Won;
    let title = i18n.t(if won { "won-title" } else { "lost-title" });
    let dialog = base_dialog(parent, &title);
    pad_button(&dialog.add_button(&i18n.t("play-again"), ResponseType::Accept));

    let mut score_args = FluentArgs::new();
    score_args.set("score", score);
    let mut target_args = FluentArgs::new();
    target_args.set("target", target_score);
    let message = format!(
        "{}\n{}\n{}",
        i18n.t(if won { "won-message" } else { "lost-message" }),
        i18n.t_args("final-score", &score_args),
        i18n.t_args("target-score", &target_args),
    );

    let label = Label::new(Some(&message));
    label.add_css_class("game-over-label");
    label.set_justify(gtk4::Justification::Center);
    dialog.content_area().append(&label);

    dialog.connect_response(move |dialog, response| {
        if response == ResponseType::Accept {
            on_play_again();
        }
        dialog.close();
    });

    dialog.show();
}

/// Ask a yes/no question; `on_confirm` runs on OK.
pub fn confirm(
    parent: &ApplicationWindow,
    i18n: &I18n,
    title_id: &str,
    message_id: &str,
    on_confirm: impl Fn() + 'static,
) {
    let dialog = base_dialog(parent, &i18n.t(title_id));
    pad_button(&dialog.add_button(&i18n.t("ok"), ResponseType::Accept));
    pad_button(&dialog.add_button(&i18n.t("cancel"), ResponseType::Cancel));

    let label = Label::new(Some(&i18n.t(message_id)));
    label.set_wrap(true);
    dialog.content_area().append(&label);

    dialog.connect_response(move |dialog, response| {
        dialog.close();
        if response == ResponseType::Accept {
            on_confirm();
        }
    });

    dialog.show();
}

/// Show a simple info message box.
pub fn show_info(parent: &ApplicationWindow, title: &str, message: &str, i18n: &I18n) {
    let dialog = base_dialog(parent, title);
    pad_button(&dialog.add_button(&i18n.t("ok"), ResponseType::Accept));

    let label = Label::new(Some(message));
    label.set_wrap(true);
    dialog.content_area().append(&label);

    dialog.connect_response(|dialog, _| {
        dialog.close();
    });

    dialog.show();
}
