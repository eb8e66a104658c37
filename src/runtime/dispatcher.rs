//! Update dispatcher
//!
//! Feeds callbacks through the pure [`transition`] function and executes the
//! returned effects. Commands start new sessions.

use super::traits::{CatalogClient, ChatTransport, Incoming, MenuRef, Sender, Storage};
use crate::catalog::{CatalogError, Series};
use crate::command::{help_text, Command};
use crate::config::BotConfig;
use crate::render::{
    queue_caption, render, submit_outcome_caption, Payload, FAILURE_CAPTION, NO_RESULTS_CAPTION,
    REMOVED_CAPTION,
};
use crate::state_machine::{
    transition, Action, AuthLevel, CatalogSnapshot, Effect, NavigationState, TransitionError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

pub const NOT_AUTHORIZED_CAPTION: &str = "You are not authorized";
pub const EXPIRED_CAPTION: &str = "This menu has expired";
pub const WRONG_PASSWORD_CAPTION: &str = "Wrong password";

/// Delay before polling again after a failed poll
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Routes chat updates to sessions
pub struct Dispatcher<C, S, T>
where
    C: CatalogClient + 'static,
    S: Storage,
    T: ChatTransport,
{
    catalog: Arc<C>,
    storage: S,
    transport: T,
    config: BotConfig,
    /// Root folders, profiles and tags; refreshed on new searches
    snapshot: RwLock<CatalogSnapshot>,
}

impl<C, S, T> Dispatcher<C, S, T>
where
    C: CatalogClient + 'static,
    S: Storage,
    T: ChatTransport,
{
    pub fn new(catalog: Arc<C>, storage: S, transport: T, config: BotConfig) -> Self {
        Self {
            catalog,
            storage,
            transport,
            config,
            snapshot: RwLock::new(CatalogSnapshot::default()),
        }
    }

    /// Poll for updates and handle them until `cancel` fires
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(command = %self.config.command, "Starting dispatcher");
        if let Err(e) = self.refresh_snapshot().await {
            tracing::warn!(error = %e, "Initial catalog snapshot failed");
        }

        loop {
            let batch = tokio::select! {
                () = cancel.cancelled() => break,
                batch = self.transport.next_updates() => batch,
            };

            match batch {
                Ok(updates) => {
                    for update in updates {
                        if let Err(e) = self.handle(update).await {
                            tracing::error!(error = %e, "Error handling update");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Polling for updates failed");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                    }
                }
            }
        }

        tracing::info!("Dispatcher stopped");
    }

    /// Handle a single update
    pub async fn handle(&self, update: Incoming) -> Result<(), String> {
        match update {
            Incoming::Text {
                chat_id,
                sender,
                text,
            } => match Command::parse(&text, &self.config.command) {
                Some(command) => self.handle_command(chat_id, &sender, command).await,
                None => Ok(()),
            },
            Incoming::Callback {
                query_id,
                menu,
                sender,
                data,
            } => self.handle_callback(&query_id, menu, &sender, &data).await,
        }
    }

    async fn refresh_snapshot(&self) -> Result<(), String> {
        let snapshot = self.catalog.snapshot().await.map_err(|e| e.to_string())?;
        tracing::debug!(
            root_folders = snapshot.root_folders.len(),
            quality_profiles = snapshot.quality_profiles.len(),
            tags = snapshot.tags.len(),
            "Catalog snapshot refreshed"
        );
        *self.snapshot.write().await = snapshot;
        Ok(())
    }

    // ==================== Commands ====================

    async fn handle_command(
        &self,
        chat_id: i64,
        sender: &Sender,
        command: Command,
    ) -> Result<(), String> {
        tracing::info!(
            chat_id,
            user_id = sender.user_id,
            command = command.name(),
            "Command received"
        );

        if let Command::Auth(password) = &command {
            return self.authorize(chat_id, sender, password).await;
        }

        let Some(level) = self.storage.auth_level(sender.user_id).await? else {
            self.transport
                .send(chat_id, &Payload::text(NOT_AUTHORIZED_CAPTION))
                .await?;
            return Ok(());
        };

        match command {
            Command::Help => {
                self.transport
                    .send(chat_id, &Payload::text(help_text(&self.config.command)))
                    .await?;
            }
            Command::Queue => {
                let caption = match self.catalog.queue().await {
                    Ok(items) => queue_caption(&items),
                    Err(e) => {
                        tracing::warn!(error = %e, "Fetching queue failed");
                        FAILURE_CAPTION.to_string()
                    }
                };
                self.transport.send(chat_id, &Payload::text(caption)).await?;
            }
            Command::Search(term) => {
                let items = self.catalog.lookup(&term).await;
                self.start_session(chat_id, level, items).await?;
            }
            Command::List => {
                let items = self.catalog.list_series().await;
                self.start_session(chat_id, level, items).await?;
            }
            Command::Auth(_) => {}
        }
        Ok(())
    }

    async fn authorize(&self, chat_id: i64, sender: &Sender, password: &str) -> Result<(), String> {
        let caption = match self.config.level_for_password(password) {
            Some(level) => {
                self.storage.grant(sender, level).await?;
                tracing::info!(user_id = sender.user_id, ?level, "User authorized");
                format!("Authorized as {level:?}")
            }
            None => {
                tracing::warn!(user_id = sender.user_id, "Authorization with wrong password");
                WRONG_PASSWORD_CAPTION.to_string()
            }
        };
        self.transport.send(chat_id, &Payload::text(caption)).await?;
        Ok(())
    }

    /// Send the first menu for a result list and persist its session
    async fn start_session(
        &self,
        chat_id: i64,
        level: AuthLevel,
        items: Result<Vec<Series>, CatalogError>,
    ) -> Result<(), String> {
        let items = match items {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "Catalog query failed");
                self.transport.send(chat_id, &Payload::text(FAILURE_CAPTION)).await?;
                return Ok(());
            }
        };
        if items.is_empty() {
            self.transport
                .send(chat_id, &Payload::text(NO_RESULTS_CAPTION))
                .await?;
            return Ok(());
        }

        if let Err(e) = self.refresh_snapshot().await {
            tracing::warn!(error = %e, "Catalog snapshot refresh failed, using previous one");
        }
        let snapshot = self.snapshot.read().await.clone();

        let state = NavigationState::new(items, &snapshot);
        let payload = render(&state, &snapshot, level.can_edit(), true);
        let message_id = self.transport.send(chat_id, &payload).await?;

        let menu = MenuRef { chat_id, message_id };
        self.storage.save_session(&menu.session_key(), &state).await?;
        tracing::info!(chat_id, message_id, results = state.items.len(), "Session started");
        Ok(())
    }

    // ==================== Callbacks ====================

    async fn handle_callback(
        &self,
        query_id: &str,
        menu: Option<MenuRef>,
        sender: &Sender,
        data: &str,
    ) -> Result<(), String> {
        let Some(level) = self.storage.auth_level(sender.user_id).await? else {
            return self
                .transport
                .answer(query_id, Some(NOT_AUTHORIZED_CAPTION), true)
                .await;
        };

        let action = match Action::parse(data) {
            Ok(action) => action,
            Err(e) => {
                tracing::warn!(data, error = %e, "Unparseable callback data");
                return self.transport.answer(query_id, None, false).await;
            }
        };
        if action == Action::Noop {
            return self.transport.answer(query_id, None, false).await;
        }

        let Some(menu) = menu else {
            return self.transport.answer(query_id, Some(EXPIRED_CAPTION), false).await;
        };
        let key = menu.session_key();
        let Some(state) = self.storage.load_session(&key).await? else {
            return self.transport.answer(query_id, Some(EXPIRED_CAPTION), false).await;
        };

        // Tags change outside the bot; reload them before showing the tag list
        if action == Action::Tags {
            match self.catalog.tags().await {
                Ok(tags) => self.snapshot.write().await.tags = tags,
                Err(e) => tracing::warn!(error = %e, "Refreshing tags failed"),
            }
        }
        let snapshot = self.snapshot.read().await.clone();

        let result = match transition(&state, &snapshot, action, level) {
            Ok(result) => result,
            Err(e @ TransitionError::MissingPermissions) => {
                tracing::info!(
                    user_id = sender.user_id,
                    action = %action.kind(),
                    "Permission denied"
                );
                return self
                    .transport
                    .answer(query_id, Some(&e.to_string()), true)
                    .await;
            }
            Err(e @ TransitionError::InvalidTransition(_)) => {
                tracing::warn!(
                    session = %key,
                    action = %action.kind(),
                    error = %e,
                    "Rejected action"
                );
                return self.transport.answer(query_id, None, false).await;
            }
        };
        self.transport.answer(query_id, None, false).await?;

        if action.kind().is_terminal() {
            tracing::info!(session = %key, action = %action.kind(), "Session ended");
        } else {
            tracing::debug!(
                session = %key,
                action = %action.kind(),
                effects = result.effects.len(),
                "Transition applied"
            );
        }
        let mut ctx = EffectContext {
            menu,
            key,
            previous: &state,
            state: result.new_state.as_ref(),
            snapshot: &snapshot,
            allow_edit: level.can_edit(),
        };
        for effect in result.effects {
            if let Err(e) = self.execute_effect(&mut ctx, effect).await {
                tracing::error!(session = %ctx.key, error = %e, "Effect failed");
            }
        }
        Ok(())
    }

    async fn execute_effect(
        &self,
        ctx: &mut EffectContext<'_>,
        effect: Effect,
    ) -> Result<(), String> {
        match effect {
            Effect::PersistState => {
                if let Some(state) = ctx.state {
                    self.storage.save_session(&ctx.key, state).await?;
                }
                Ok(())
            }

            Effect::ClearSession => self.storage.clear_session(&ctx.key).await,

            Effect::Repaint { full_redraw } => {
                let Some(state) = ctx.state else {
                    return Ok(());
                };
                let payload = render(state, ctx.snapshot, ctx.allow_edit, full_redraw);
                if full_redraw && ctx.shows_photo() != payload.photo.is_some() {
                    return self.replace_menu(ctx, state, &payload).await;
                }
                self.transport.edit(ctx.menu, &payload).await
            }

            Effect::SearchSeason { series_id, season } => {
                // Fire-and-forget: the menu does not wait for Sonarr
                let catalog = Arc::clone(&self.catalog);
                tokio::spawn(async move {
                    if let Err(e) = catalog.search_season(series_id, season).await {
                        tracing::warn!(series_id, season, error = %e, "Season search failed");
                    }
                });
                Ok(())
            }

            Effect::SubmitSeries(submission) => {
                let outcome = self.catalog.submit(&submission).await;
                if let Err(e) = &outcome {
                    tracing::warn!(
                        title = %submission.series.title,
                        error = %e,
                        "Submitting series failed"
                    );
                } else {
                    tracing::info!(
                        title = %submission.series.title,
                        update = submission.is_update(),
                        search = submission.search_for_missing,
                        "Series submitted"
                    );
                }
                let caption = submit_outcome_caption(submission.is_update(), outcome.is_ok());
                self.transport.edit(ctx.menu, &Payload::text(caption)).await
            }

            Effect::RemoveSeries { series_id } => {
                let caption = match self.catalog.remove(series_id).await {
                    Ok(()) => {
                        tracing::info!(series_id, "Series removed");
                        REMOVED_CAPTION
                    }
                    Err(e) => {
                        tracing::warn!(series_id, error = %e, "Removing series failed");
                        FAILURE_CAPTION
                    }
                };
                self.transport.edit(ctx.menu, &Payload::text(caption)).await
            }

            Effect::Reply { caption } => {
                self.transport
                    .edit(ctx.menu, &Payload::text(caption))
                    .await
            }
        }
    }

    /// Telegram cannot turn a text message into a photo or back, so the menu
    /// is sent again and the session follows the new message.
    async fn replace_menu(
        &self,
        ctx: &mut EffectContext<'_>,
        state: &NavigationState,
        payload: &Payload,
    ) -> Result<(), String> {
        let old = ctx.menu;
        let message_id = self.transport.send(old.chat_id, payload).await?;
        let menu = MenuRef {
            chat_id: old.chat_id,
            message_id,
        };

        self.storage.save_session(&menu.session_key(), state).await?;
        self.storage.clear_session(&ctx.key).await?;
        tracing::debug!(from = %ctx.key, to = %menu.session_key(), "Menu message replaced");
        ctx.menu = menu;
        ctx.key = menu.session_key();

        if let Err(e) = self.transport.delete(old).await {
            tracing::warn!(
                chat_id = old.chat_id,
                message_id = old.message_id,
                error = %e,
                "Deleting old menu failed"
            );
        }
        Ok(())
    }
}

/// Everything an effect needs to know about the session it belongs to
struct EffectContext<'a> {
    /// Message currently showing the menu
    menu: MenuRef,
    key: String,
    /// State the menu was last drawn from
    previous: &'a NavigationState,
    /// State after the transition, `None` once cleared
    state: Option<&'a NavigationState>,
    snapshot: &'a CatalogSnapshot,
    allow_edit: bool,
}

impl EffectContext<'_> {
    /// Whether the menu message carries a poster.
    ///
    /// Posters are only set on full redraws, which always show the item
    /// under the cursor.
    fn shows_photo(&self) -> bool {
        self.previous
            .current()
            .and_then(Series::poster_url)
            .is_some()
    }
}
