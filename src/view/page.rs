//! # Photo Settings Page
//!
//! Server-rendered HTML for the photo settings form.

use maud::{DOCTYPE, Markup, html};

use super::state::{ButtonStatus, PhotoForm, ViewState};
use crate::models::{Intent, ProfilePhotoUser};
use crate::utils::constant::{
    CSRF_FIELD, DELETE_ARMED, DELETE_CHECK_FIELD, DELETE_UNARMED, INTENT_FIELD, PHOTO_FILE_FIELD,
    PROFILE_PHOTO_PATH,
};

/// Renders the photo settings page for `user` in the state held by `form`.
///
/// The page carries the anti-forgery token and the delete confirmation
/// state in hidden fields, shows the pending or stored image, and swaps its
/// buttons according to the named view state:
///
/// 1. `NoFileSelected` - file picker, "Save Photo" and, when a photo exists,
///    the two-press delete button.
/// 2. `FileSelectedUncropped` - the crop widget plus "Save Photo" and "Reset".
/// 3. `FileSelectedCropped` - as above, noting that the crop will be saved.
pub fn render_photo_page(user: &ProfilePhotoUser, form: &PhotoForm, csrf_token: &str) -> Markup {
    let display_name = user.display_name();
    let view_state = form.view_state();
    let delete_check = if form.delete_armed() {
        DELETE_ARMED
    } else {
        DELETE_UNARMED
    };
    let delete_label = if form.delete_armed() {
        "Are you sure?"
    } else {
        "Delete"
    };

    let mut errors: Vec<&String> = form.errors_for(PHOTO_FILE_FIELD).iter().collect();
    errors.extend(form.errors_for(INTENT_FIELD));
    if let Some(result) = form.last_result() {
        errors.extend(&result.form_errors);
    }

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Profile photo | " (display_name) }
            }
            body {
                main.photo-settings {
                    h1 { "Profile photo" }
                    form method="POST" action=(PROFILE_PHOTO_PATH) enctype="multipart/form-data" {
                        input type="hidden" name=(CSRF_FIELD) value=(csrf_token);
                        input type="hidden" name=(DELETE_CHECK_FIELD) value=(delete_check);
                        @match form.image_src() {
                            Some(src) => { img.photo src=(src) alt=(display_name); }
                            None => {
                                div.photo.photo-placeholder aria-label=(display_name) {
                                    (initials(display_name))
                                }
                            }
                        }
                        input id="photoFile" type="file" name=(PHOTO_FILE_FIELD) accept="image/*";
                        div.controls {
                            @match view_state {
                                ViewState::NoFileSelected => {
                                    label.button for=(PHOTO_FILE_FIELD) { "Change" }
                                    (button(form, Intent::Submit, "Save Photo", "primary"))
                                    @if form.current_image().is_some() {
                                        (button(form, Intent::Delete, delete_label, "danger"))
                                    }
                                }
                                ViewState::FileSelectedUncropped | ViewState::FileSelectedCropped => {
                                    div.crop-widget data-crop-widget {}
                                    @if view_state == ViewState::FileSelectedCropped {
                                        p.crop-note { "Cropped photo will be saved." }
                                    }
                                    (button(form, Intent::Submit, "Save Photo", "primary"))
                                    button.button type="reset" { "Reset" }
                                }
                            }
                        }
                        @if !errors.is_empty() {
                            ul.errors id="photoFile-error" {
                                @for error in &errors {
                                    li { (error) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn button(form: &PhotoForm, intent: Intent, label: &str, variant: &str) -> Markup {
    let status = form.button_status(intent);
    let (status_name, suffix) = match status {
        ButtonStatus::Idle => ("idle", ""),
        ButtonStatus::Pending => ("pending", " …"),
        ButtonStatus::Success => ("success", " ✓"),
        ButtonStatus::Error => ("error", " ✗"),
    };

    html! {
        button type="submit" name=(INTENT_FIELD) value=(intent.as_str())
            class=(format!("button {variant}")) data-status=(status_name)
            disabled[status == ButtonStatus::Pending] {
            (label) (suffix)
        }
    }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}
