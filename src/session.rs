use crate::error::{SessionError, SessionResult, ValidationError};
use crate::filter::{DisplayProperty, FuzzyMatcher, filter_properties};
use crate::node::{self, Node, NodeIdentity};
use crate::notify::Notifier;
use crate::repository::{FindOptions, NewProperty, Repository};
use crate::statics;
use crate::tree::{TreeMirror, TreeSynchronizer};
use crate::value::PropertyValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    Loading,
    Loaded,
}

/// Which edit form is open. At most one can be pending at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    RenamePending,
    PropertyPending,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameForm {
    pub name: Option<String>,
}

/// Create-property form. `value` is always the editable text; it is only parsed on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyForm {
    pub name: Option<String>,
    pub value: Option<String>,
    pub type_code: Option<u8>,
}

impl PropertyForm {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
            type_code: None,
        }
    }

    pub fn with_type(mut self, type_code: u8) -> Self {
        self.type_code = Some(type_code);
        self
    }
}

/// Interaction state of a form input, as reported by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldState {
    pub dirty: bool,
    pub required_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The candidate equalled the current name; the form was closed without a request.
    Unchanged,
    /// The caller should navigate to `target`.
    Renamed { target: NodeIdentity },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraggableData {
    pub property: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DroppableData {
    pub trash: bool,
}

/// Editing session for one repository node: holds the loaded node, its filtered property
/// list and the two edit forms, and sequences every mutation against the repository.
pub struct NodeSession<R, M, N> {
    repository: R,
    matcher: M,
    notifier: N,
    phase: SessionPhase,
    edit: EditState,
    node: Option<Node>,
    search: Option<String>,
    properties: Vec<DisplayProperty>,
    rename_form: RenameForm,
    property_form: PropertyForm,
    search_subscription: Option<Box<dyn FnOnce() + Send>>,
    destroyed: bool,
}

impl<R, M, N> NodeSession<R, M, N>
where
    R: Repository,
    M: FuzzyMatcher,
    N: Notifier,
{
    pub fn new(repository: R, matcher: M, notifier: N) -> Self {
        Self {
            repository,
            matcher,
            notifier,
            phase: SessionPhase::Empty,
            edit: EditState::Idle,
            node: None,
            search: None,
            properties: Vec::new(),
            rename_form: RenameForm::default(),
            property_form: PropertyForm::default(),
            search_subscription: None,
            destroyed: false,
        }
    }

    /// Attach the search-term listener registration; `cancel` runs once on `destroy`.
    pub fn with_search_subscription(mut self, cancel: impl FnOnce() + Send + 'static) -> Self {
        self.search_subscription = Some(Box::new(cancel));
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn edit_state(&self) -> EditState {
        self.edit
    }

    pub fn rename_form_displayed(&self) -> bool {
        self.edit == EditState::RenamePending
    }

    pub fn property_form_displayed(&self) -> bool {
        self.edit == EditState::PropertyPending
    }

    /// True while either edit form is open. Callers disable other destructive actions
    /// (renames, property drops) while this is set.
    pub fn is_pending(&self) -> bool {
        self.rename_form_displayed() || self.property_form_displayed()
    }

    pub fn node(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    pub fn properties(&self) -> &[DisplayProperty] {
        &self.properties
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn rename_form(&self) -> &RenameForm {
        &self.rename_form
    }

    pub fn rename_form_mut(&mut self) -> &mut RenameForm {
        &mut self.rename_form
    }

    pub fn property_form(&self) -> &PropertyForm {
        &self.property_form
    }

    pub fn property_form_mut(&mut self) -> &mut PropertyForm {
        &mut self.property_form
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ensure_live(&self) -> SessionResult<()> {
        if self.destroyed {
            return Err(SessionError::Destroyed);
        }
        Ok(())
    }

    fn current_identity(&self) -> SessionResult<NodeIdentity> {
        self.node
            .as_ref()
            .map(|node| node.identity.clone())
            .ok_or(SessionError::NoNodeLoaded)
    }

    /// Fetch the node at `identity`. On failure the previously held node stays in place.
    pub async fn load(&mut self, identity: NodeIdentity, use_cache: bool) -> SessionResult<&Node> {
        self.ensure_live()?;

        let previous = self.phase;
        self.phase = SessionPhase::Loading;
        log::debug!("loading {} (cache: {use_cache})", identity.path);

        let options = FindOptions { cache: use_cache };
        let node = match self.repository.find(&identity, options).await {
            Ok(node) => node,
            Err(err) => {
                self.phase = previous;
                log::warn!("failed to load {}: {err}", identity.path);
                return Err(err.into());
            }
        };

        self.rename_form.name = Some(node.name.clone());
        self.phase = SessionPhase::Loaded;
        self.node = Some(node);
        self.refilter();
        self.node.as_ref().ok_or(SessionError::NoNodeLoaded)
    }

    /// Reload the current node past the repository cache.
    pub async fn refresh(&mut self) -> SessionResult<&Node> {
        let identity = self.current_identity()?;
        self.load(identity, false).await
    }

    /// Search listener callback. Recomputes the display list only when the term changed.
    pub fn set_search(&mut self, term: Option<String>) {
        if self.destroyed || self.search == term {
            return;
        }
        self.search = term;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.properties = match &self.node {
            Some(node) => {
                filter_properties(&node.properties, self.search.as_deref(), &self.matcher)
            }
            None => Vec::new(),
        };
        log::debug!("{} properties displayed", self.properties.len());
    }

    fn reset_rename_form(&mut self) {
        self.rename_form.name = self.node.as_ref().map(|node| node.name.clone());
    }

    /// Open the rename form. The root cannot be renamed, so this is a no-op there.
    pub fn open_rename_form(&mut self) -> bool {
        let Some(node) = &self.node else {
            return false;
        };
        if self.destroyed || node.is_root() {
            return false;
        }
        if self.edit == EditState::PropertyPending {
            self.property_form = PropertyForm::default();
        }
        if self.rename_form.name.is_none() {
            self.reset_rename_form();
        }
        self.edit = EditState::RenamePending;
        true
    }

    pub fn cancel_rename_form(&mut self) {
        if self.edit == EditState::RenamePending {
            self.edit = EditState::Idle;
        }
        self.reset_rename_form();
    }

    /// Rename the current node to `candidate`, then update `tree` to match.
    ///
    /// The root node is never renamed. On a repository failure the form stays open with the
    /// candidate kept for correction.
    pub async fn submit_rename<T: TreeMirror>(
        &mut self,
        candidate: Option<String>,
        tree: &mut T,
    ) -> SessionResult<RenameOutcome> {
        self.ensure_live()?;
        let identity = self.current_identity()?;
        if node::is_root_path(&identity.path) {
            log::debug!("ignoring rename of the root node");
            self.cancel_rename_form();
            return Ok(RenameOutcome::Unchanged);
        }
        self.rename_form.name = candidate;

        let name = match self.rename_form.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(self.reject(ValidationError::EmptyName)),
        };

        if self.node.as_ref().is_some_and(|node| node.name == name) {
            self.cancel_rename_form();
            return Ok(RenameOutcome::Unchanged);
        }

        if let Err(err) = self.repository.rename(&identity, &name).await {
            log::warn!("rename of {} failed: {err}", identity.path);
            self.notifier.error_from_response(&err);
            return Err(err.into());
        }

        log::info!("renamed {} to {name}", identity.path);
        self.notifier.success(statics::EN_NODE_RENAMED);

        let new_path = match TreeSynchronizer::on_renamed(tree, &identity.path, &name).await {
            Ok(path) => path,
            Err(err) => {
                self.notifier.error(&err.to_string());
                return Err(err.into());
            }
        };

        self.cancel_rename_form();
        Ok(RenameOutcome::Renamed {
            target: identity.with_path(new_path),
        })
    }

    pub fn open_property_form(&mut self) {
        if self.destroyed {
            return;
        }
        if self.edit == EditState::RenamePending {
            self.reset_rename_form();
        }
        self.property_form = PropertyForm::default();
        self.edit = EditState::PropertyPending;
    }

    pub fn cancel_property_form(&mut self) {
        if self.edit == EditState::PropertyPending {
            self.edit = EditState::Idle;
        }
        self.property_form = PropertyForm::default();
    }

    /// Create a property from `form`. The value is sent as a JSON literal when it parses
    /// as one, otherwise as the typed text.
    ///
    /// Success closes the form and reloads the node before notifying. A failed create keeps
    /// the form open with its value rendered back to editable text.
    pub async fn submit_property(&mut self, form: PropertyForm) -> SessionResult<()> {
        self.ensure_live()?;
        let identity = self.current_identity()?;
        self.property_form = form;

        let name = match self.property_form.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(self.reject(ValidationError::EmptyName)),
        };
        let raw = match self.property_form.value.as_deref() {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => return Err(self.reject(ValidationError::EmptyValue)),
        };
        let type_code = *self.property_form.type_code.get_or_insert(0);

        let value = PropertyValue::from_form_input(&raw);
        let request = NewProperty {
            name,
            value: value.clone(),
            type_code,
        };

        if let Err(err) = self.repository.create_property(&identity, request).await {
            log::warn!("create property on {} failed: {err}", identity.path);
            self.property_form.value = Some(editable_text(&value, raw));
            if self.edit == EditState::RenamePending {
                self.reset_rename_form();
            }
            self.edit = EditState::PropertyPending;
            self.notifier.error_from_response(&err);
            return Err(err.into());
        }

        self.cancel_property_form();
        self.reload_then_notify(identity, statics::EN_PROPERTY_CREATED).await
    }

    pub async fn remove_property(&mut self, name: &str) -> SessionResult<()> {
        self.ensure_live()?;
        let identity = self.current_identity()?;

        if let Err(err) = self.repository.remove_property(&identity, name).await {
            log::warn!("remove property {name} on {} failed: {err}", identity.path);
            self.notifier.error_from_response(&err);
            return Err(err.into());
        }

        self.reload_then_notify(identity, statics::EN_PROPERTY_REMOVED).await
    }

    /// The mutation has committed; a failed reload is still reported as a failure and
    /// suppresses the success message.
    async fn reload_then_notify(
        &mut self,
        identity: NodeIdentity,
        message: &str,
    ) -> SessionResult<()> {
        let reloaded = self.load(identity, false).await.map(|_| ());
        if let Err(err) = reloaded {
            match &err {
                SessionError::Repository(response) => self.notifier.error_from_response(response),
                other => self.notifier.error(&other.to_string()),
            }
            return Err(err);
        }
        log::info!("{message}");
        self.notifier.success(message);
        Ok(())
    }

    fn reject(&self, err: ValidationError) -> SessionError {
        self.notifier.error(&err.to_string());
        err.into()
    }

    /// Untouched fields are always valid. Once dirty, the name must be present and must not
    /// collide with an existing property of the node.
    pub fn is_property_name_valid(&self, field: FieldState) -> bool {
        if !field.dirty {
            return true;
        }
        let exists = match (&self.node, self.property_form.name.as_deref()) {
            (Some(node), Some(name)) => node.has_property(name),
            _ => false,
        };
        !field.required_error && !exists
    }

    pub fn is_property_value_valid(&self, field: FieldState) -> bool {
        !field.dirty || !field.required_error
    }

    /// Drop handler: a property dropped on the trash target is removed; anything else is ignored.
    pub async fn on_element_dropped(
        &mut self,
        draggable: &DraggableData,
        droppable: &DroppableData,
    ) -> SessionResult<bool> {
        match (draggable.property.as_deref(), droppable.trash) {
            (Some(name), true) => self.remove_property(name).await.map(|()| true),
            _ => Ok(false),
        }
    }

    /// Release the search subscription and drop all held state. Safe to call twice.
    pub fn destroy(&mut self) {
        if let Some(cancel) = self.search_subscription.take() {
            cancel();
        }
        if !self.destroyed {
            log::debug!("session destroyed");
        }
        self.node = None;
        self.properties.clear();
        self.search = None;
        self.rename_form = RenameForm::default();
        self.property_form = PropertyForm::default();
        self.edit = EditState::Idle;
        self.phase = SessionPhase::Empty;
        self.destroyed = true;
    }
}

/// Text to put back in the form after a failed create: JSON for the parsed value when it
/// has one, else the text as typed.
fn editable_text(value: &PropertyValue, raw: String) -> String {
    match value.to_json() {
        Ok(text) => text,
        Err(err) => {
            log::debug!("keeping typed value: {err}");
            raw
        }
    }
}
