//! Authentication route handlers.
//!
//! Handles login, registration, logout, and the three-step password reset
//! (email a code, verify the code, set a new password) against the remote
//! service. Every form is validated locally first; a form with field errors
//! is re-rendered without any remote call.
//!
//! Forms post with HTMX and swap themselves, so a failed submission returns
//! only the form fragment. Plain posts get the full page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use freshcart_core::{
    FieldErrors, ForgotPasswordInput, ResetCodeInput, ResetPasswordInput, Route, SignInInput,
    SignUpInput,
};

use super::Nav;
use crate::error::{AppError, add_breadcrumb};
use crate::htmx::{self, HxRequest};
use crate::middleware::CurrentSession;
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Success codes carried to the login page after a redirect.
const REGISTERED: &str = "registered";
const PASSWORD_RESET: &str = "password_reset";

/// Human text for a success code; unknown codes are dropped.
fn notice_for(code: Option<&str>) -> Option<String> {
    match code? {
        REGISTERED => Some("Account created. Sign in to continue.".to_string()),
        PASSWORD_RESET => Some("Password updated. Sign in with your new password.".to_string()),
        _ => None,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub form: SignInInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Login form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login_form.html")]
pub struct LoginFormTemplate {
    pub form: SignInInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: Nav,
    pub form: SignUpInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Register form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register_form.html")]
pub struct RegisterFormTemplate {
    pub form: SignUpInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub nav: Nav,
    pub form: ForgotPasswordInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Forgot password form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password_form.html")]
pub struct ForgotPasswordFormTemplate {
    pub form: ForgotPasswordInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Reset code page template (step two of the reset flow).
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_code.html")]
pub struct VerifyCodeTemplate {
    pub nav: Nav,
    pub form: ResetCodeInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Reset code form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_code_form.html")]
pub struct VerifyCodeFormTemplate {
    pub form: ResetCodeInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub nav: Nav,
    pub form: ResetPasswordInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Reset password form fragment.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password_form.html")]
pub struct ResetPasswordFormTemplate {
    pub form: ResetPasswordInput,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(nav: Nav, Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        nav,
        form: SignInInput::default(),
        errors: FieldErrors::new(),
        error: query.error,
        notice: notice_for(query.success.as_deref()),
    }
}

/// Handle login form submission.
///
/// On success the token is stored in the session (rotating the session ID)
/// and the visitor is sent to the home page.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    nav: Nav,
    hx: HxRequest,
    Form(form): Form<SignInInput>,
) -> Response {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => return login_form(hx, nav, form, errors, None),
    };

    match state.api().sign_in(&credentials).await {
        Ok(token) => {
            if let Err(e) = session.sign_in(token).await {
                return AppError::from(e).into_response();
            }
            add_breadcrumb("auth", "Signed in", None);
            htmx::redirect(hx, &Route::Home.path())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            login_form(hx, nav, form, FieldErrors::new(), Some(e.user_message()))
        }
    }
}

fn login_form(
    hx: HxRequest,
    nav: Nav,
    form: SignInInput,
    errors: FieldErrors,
    error: Option<String>,
) -> Response {
    // Never echo the password back.
    let form = SignInInput {
        password: String::new(),
        ..form
    };
    if hx.0 {
        LoginFormTemplate {
            form,
            errors,
            error,
            notice: None,
        }
        .into_response()
    } else {
        LoginTemplate {
            nav,
            form,
            errors,
            error,
            notice: None,
        }
        .into_response()
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(nav: Nav, Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        nav,
        form: SignUpInput::default(),
        errors: FieldErrors::new(),
        error: query.error,
    }
}

/// Handle registration form submission.
///
/// The visitor is not signed in afterwards; they land on the login page.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    nav: Nav,
    hx: HxRequest,
    Form(form): Form<SignUpInput>,
) -> Response {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => return register_form(hx, nav, form, errors, None),
    };

    match state.api().sign_up(&registration).await {
        Ok(()) => {
            add_breadcrumb("auth", "Registered", None);
            htmx::redirect(hx, &format!("{}?success={REGISTERED}", Route::SIGN_IN_PATH))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            register_form(hx, nav, form, FieldErrors::new(), Some(e.user_message()))
        }
    }
}

fn register_form(
    hx: HxRequest,
    nav: Nav,
    form: SignUpInput,
    errors: FieldErrors,
    error: Option<String>,
) -> Response {
    let form = SignUpInput {
        password: String::new(),
        re_password: String::new(),
        ..form
    };
    if hx.0 {
        RegisterFormTemplate {
            form,
            errors,
            error,
        }
        .into_response()
    } else {
        RegisterTemplate {
            nav,
            form,
            errors,
            error,
        }
        .into_response()
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(
    nav: Nav,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    ForgotPasswordTemplate {
        nav,
        form: ForgotPasswordInput::default(),
        errors: FieldErrors::new(),
        error: query.error,
    }
}

/// Handle forgot password form submission.
///
/// On success the reset code form replaces the email form.
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    nav: Nav,
    hx: HxRequest,
    Form(form): Form<ForgotPasswordInput>,
) -> Response {
    let email = match form.validate() {
        Ok(email) => email,
        Err(errors) => return forgot_password_form(hx, nav, form, errors, None),
    };

    match state.api().forgot_password(&email).await {
        Ok(message) => {
            let notice = Some(message.unwrap_or_else(|| "Reset code sent to your email".to_string()));
            verify_code_form(hx, nav, ResetCodeInput::default(), FieldErrors::new(), None, notice)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Password recovery request failed");
            forgot_password_form(hx, nav, form, FieldErrors::new(), Some(e.user_message()))
        }
    }
}

/// Handle reset code submission.
#[instrument(skip_all)]
pub async fn verify_reset_code(
    State(state): State<AppState>,
    nav: Nav,
    hx: HxRequest,
    Form(form): Form<ResetCodeInput>,
) -> Response {
    let code = match form.validate() {
        Ok(code) => code,
        Err(errors) => return verify_code_form(hx, nav, form, errors, None, None),
    };

    match state.api().verify_reset_code(&code).await {
        Ok(()) => htmx::redirect(hx, &Route::ResetPassword.path()),
        Err(e) => {
            tracing::warn!(error = %e, "Reset code rejected");
            verify_code_form(hx, nav, form, FieldErrors::new(), Some(e.user_message()), None)
        }
    }
}

/// Display the reset password page.
pub async fn reset_password_page(
    nav: Nav,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    ResetPasswordTemplate {
        nav,
        form: ResetPasswordInput::default(),
        errors: FieldErrors::new(),
        error: query.error,
    }
}

/// Handle reset password form submission.
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    nav: Nav,
    hx: HxRequest,
    Form(form): Form<ResetPasswordInput>,
) -> Response {
    let reset = match form.validate() {
        Ok(reset) => reset,
        Err(errors) => return reset_password_form(hx, nav, form, errors, None),
    };

    match state.api().reset_password(&reset).await {
        Ok(()) => {
            add_breadcrumb("auth", "Password reset", None);
            htmx::redirect(
                hx,
                &format!("{}?success={PASSWORD_RESET}", Route::SIGN_IN_PATH),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Password reset failed");
            reset_password_form(hx, nav, form, FieldErrors::new(), Some(e.user_message()))
        }
    }
}

fn forgot_password_form(
    hx: HxRequest,
    nav: Nav,
    form: ForgotPasswordInput,
    errors: FieldErrors,
    error: Option<String>,
) -> Response {
    if hx.0 {
        ForgotPasswordFormTemplate {
            form,
            errors,
            error,
        }
        .into_response()
    } else {
        ForgotPasswordTemplate {
            nav,
            form,
            errors,
            error,
        }
        .into_response()
    }
}

fn verify_code_form(
    hx: HxRequest,
    nav: Nav,
    form: ResetCodeInput,
    errors: FieldErrors,
    error: Option<String>,
    notice: Option<String>,
) -> Response {
    if hx.0 {
        VerifyCodeFormTemplate {
            form,
            errors,
            error,
            notice,
        }
        .into_response()
    } else {
        VerifyCodeTemplate {
            nav,
            form,
            errors,
            error,
            notice,
        }
        .into_response()
    }
}

fn reset_password_form(
    hx: HxRequest,
    nav: Nav,
    form: ResetPasswordInput,
    errors: FieldErrors,
    error: Option<String>,
) -> Response {
    let form = ResetPasswordInput {
        new_password: String::new(),
        ..form
    };
    if hx.0 {
        ResetPasswordFormTemplate {
            form,
            errors,
            error,
        }
        .into_response()
    } else {
        ResetPasswordTemplate {
            nav,
            form,
            errors,
            error,
        }
        .into_response()
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the stored token and forgets the cached cart count for it.
/// Signing out twice is harmless.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    hx: HxRequest,
) -> Response {
    match session.sign_out().await {
        Ok(Some(previous)) => {
            state.cart_counts().invalidate(&previous).await;
            add_breadcrumb("auth", "Signed out", None);
        }
        Ok(None) => {}
        Err(e) => return AppError::from(e).into_response(),
    }

    htmx::redirect(hx, Route::SIGN_IN_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_for_known_codes() {
        assert!(notice_for(Some(REGISTERED)).is_some());
        assert!(notice_for(Some(PASSWORD_RESET)).is_some());
    }

    #[test]
    fn test_notice_for_unknown_code_is_dropped() {
        assert_eq!(notice_for(Some("<script>")), None);
        assert_eq!(notice_for(None), None);
    }
}
