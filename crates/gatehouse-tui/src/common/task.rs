//! Async task lifecycle tracking.
//!
//! Every backend call spawned by the runtime carries a task id. The reducer
//! records the id on start and only applies a result whose id still matches;
//! results that arrive after the owning page moved on are dropped silently.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    SignIn,
    SignUp,
    SignOut,
    ResetLink,
    PasswordUpdate,
    ProfileLoad,
    ProfileSave,
    ProfileCreate,
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn on_started(&mut self, started: &TaskStarted) {
        self.active = Some(started.id);
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub sign_in: TaskState,
    pub sign_up: TaskState,
    pub sign_out: TaskState,
    pub reset_link: TaskState,
    pub password_update: TaskState,
    pub profile_load: TaskState,
    pub profile_save: TaskState,
    pub profile_create: TaskState,
}

impl Tasks {
    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::SignIn => &mut self.sign_in,
            TaskKind::SignUp => &mut self.sign_up,
            TaskKind::SignOut => &mut self.sign_out,
            TaskKind::ResetLink => &mut self.reset_link,
            TaskKind::PasswordUpdate => &mut self.password_update,
            TaskKind::ProfileLoad => &mut self.profile_load,
            TaskKind::ProfileSave => &mut self.profile_save,
            TaskKind::ProfileCreate => &mut self.profile_create,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.sign_in.is_running()
            || self.sign_up.is_running()
            || self.sign_out.is_running()
            || self.reset_link.is_running()
            || self.password_update.is_running()
            || self.profile_load.is_running()
            || self.profile_save.is_running()
            || self.profile_create.is_running()
    }

    pub fn clear_all(&mut self) {
        self.sign_in.clear();
        self.sign_up.clear();
        self.sign_out.clear();
        self.reset_link.clear();
        self.password_update.clear();
        self.profile_load.clear();
        self.profile_save.clear();
        self.profile_create.clear();
    }
}
