//! Materialized views.
//!
//! A `View` sits at the end of a query pipeline. It hydrates from the
//! input's initial fetch, then folds every pushed change into a
//! copy-on-write result tree. Readers take cheap `Data` snapshots; the
//! view never mutates a snapshot it already handed out.

use crate::complete::QueryComplete;
use crate::status::{QueryError, QueryStatus};
use crate::subscription::{Snapshot, SubscriptionId, SubscriptionManager};
use crate::ttl::Ttl;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::ToString;
use core::cell::RefCell;
use core::mem;
use futures::task::{LocalSpawn, LocalSpawnExt};
use log::{debug, warn};
use trellis_core::schema::{Format, SourceSchema};
use trellis_core::{Error, Result};
use trellis_incremental::{
    apply_change, skip_yields, Change, Data, Entry, FetchRequest, Input, Output, ROOT_RELATIONSHIP,
};

/// Callback a view hands to its transaction-commit registration.
pub type CommitCallback = Box<dyn Fn()>;

/// Registers a view's commit callback with the host's transaction source.
pub type TransactionCommitFn = Box<dyn FnOnce(CommitCallback)>;

/// Shared view state.
struct ViewCore {
    root: Rc<Entry>,
    schema: SourceSchema,
    format: Format,
    with_ids: bool,
    status: QueryStatus,
    error: Option<QueryError>,
    subscriptions: SubscriptionManager,
    /// Notifications wait for the next transaction commit.
    batched: bool,
    dirty: bool,
}

impl ViewCore {
    fn apply(&mut self, change: &Change) -> Result<()> {
        apply_change(
            Rc::make_mut(&mut self.root),
            change,
            &self.schema,
            ROOT_RELATIONSHIP,
            &self.format,
            self.with_ids,
        )
    }

    fn set_status(&mut self, status: QueryStatus, error: Option<QueryError>) {
        debug!(
            "view over '{}': {} -> {}",
            self.schema.table_name(),
            self.status,
            status
        );
        self.status = status;
        self.error = error;
    }

    fn data(&self) -> Data {
        Data::new(self.root.clone())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            data: self.data(),
            status: self.status,
            error: self.error.clone(),
        }
    }

}

/// Publishes the current snapshot to every active subscriber.
///
/// The view is not borrowed while callbacks run, so they may subscribe,
/// unsubscribe or read the view.
fn notify(core: &RefCell<ViewCore>) {
    let (snapshot, callbacks) = {
        let state = core.borrow();
        if state.subscriptions.is_empty() {
            return;
        }
        (state.snapshot(), state.subscriptions.active_callbacks())
    };
    for callback in callbacks {
        callback(&snapshot);
    }
}

/// Applies a change and publishes it, or marks the view dirty when
/// notifications are batched.
fn push_change(core: &RefCell<ViewCore>, change: Change) -> Result<()> {
    {
        let mut state = core.borrow_mut();
        if let Err(err) = state.apply(&change) {
            warn!(
                "view over '{}' rejected {:?}: {}",
                state.schema.table_name(),
                change.kind(),
                err
            );
            return Err(err);
        }
        if state.batched {
            state.dirty = true;
            return Ok(());
        }
    }
    notify(core);
    Ok(())
}

fn flush(core: &RefCell<ViewCore>) {
    let dirty = mem::take(&mut core.borrow_mut().dirty);
    if dirty {
        notify(core);
    }
}

/// The output a view registers with its input.
///
/// Holds the view weakly: once the view is dropped, pushed changes are
/// discarded.
#[derive(Clone)]
pub struct ViewOutput {
    core: Weak<RefCell<ViewCore>>,
}

impl ViewOutput {
    /// Returns true while the view is alive.
    pub fn is_attached(&self) -> bool {
        self.core.strong_count() > 0
    }
}

impl Output for ViewOutput {
    fn push(&mut self, change: Change) -> Result<()> {
        match self.core.upgrade() {
            Some(core) => push_change(&core, change),
            None => {
                debug!("view dropped, discarding {:?}", change.kind());
                Ok(())
            }
        }
    }
}

/// Configures and builds a `View`.
pub struct ViewBuilder {
    format: Format,
    on_destroy: Option<Box<dyn FnOnce()>>,
    on_transaction_commit: Option<TransactionCommitFn>,
    query_complete: QueryComplete,
    update_ttl: Option<Box<dyn Fn(Ttl)>>,
    with_ids: bool,
}

impl ViewBuilder {
    /// Starts a builder for a view of the given shape.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            on_destroy: None,
            on_transaction_commit: None,
            query_complete: QueryComplete::Complete,
            update_ttl: None,
            with_ids: false,
        }
    }

    /// Sets the callback run by `View::destroy`.
    pub fn on_destroy<F: FnOnce() + 'static>(mut self, on_destroy: F) -> Self {
        self.on_destroy = Some(Box::new(on_destroy));
        self
    }

    /// Batches subscriber notifications per transaction.
    ///
    /// `register` is called once during `build` with the callback the host
    /// must run after each committed transaction.
    pub fn on_transaction_commit<F: FnOnce(CommitCallback) + 'static>(mut self, register: F) -> Self {
        self.on_transaction_commit = Some(Box::new(register));
        self
    }

    /// Sets the completion indicator.
    pub fn query_complete(mut self, complete: impl Into<QueryComplete>) -> Self {
        self.query_complete = complete.into();
        self
    }

    /// Sets the delegate `View::update_ttl` forwards to.
    pub fn update_ttl<F: Fn(Ttl) + 'static>(mut self, update_ttl: F) -> Self {
        self.update_ttl = Some(Box::new(update_ttl));
        self
    }

    /// Derives an id from each entry's primary key.
    pub fn with_ids(mut self, with_ids: bool) -> Self {
        self.with_ids = with_ids;
        self
    }

    /// Builds the view: hydrates from the initial fetch, registers its
    /// output with `input` and, for a pending completion indicator, spawns
    /// the continuation that settles the status.
    ///
    /// If hydration fails no output is registered.
    pub fn build(self, input: &mut dyn Input, spawner: &dyn LocalSpawn) -> Result<View> {
        let schema = input.schema().clone();
        let core = Rc::new(RefCell::new(ViewCore {
            root: Rc::new(Entry::root(self.format.singular)),
            schema,
            format: self.format,
            with_ids: self.with_ids,
            status: QueryStatus::Unknown,
            error: None,
            subscriptions: SubscriptionManager::new(),
            batched: self.on_transaction_commit.is_some(),
            dirty: false,
        }));

        if let Some(register) = self.on_transaction_commit {
            let weak = Rc::downgrade(&core);
            register(Box::new(move || {
                if let Some(core) = weak.upgrade() {
                    flush(&core);
                }
            }));
        }

        {
            let mut state = core.borrow_mut();
            for node in skip_yields(input.fetch(FetchRequest::default())) {
                state.apply(&Change::add(node))?;
            }
        }

        // Only a hydrated view is connected.
        input.set_output(Box::new(ViewOutput {
            core: Rc::downgrade(&core),
        }));

        match self.query_complete {
            QueryComplete::Complete => core.borrow_mut().set_status(QueryStatus::Complete, None),
            QueryComplete::Errored(err) => core
                .borrow_mut()
                .set_status(QueryStatus::Error, Some(QueryError::from(&err))),
            QueryComplete::Pending(future) => {
                let weak = Rc::downgrade(&core);
                spawner
                    .spawn_local(async move {
                        let result = future.await;
                        let Some(core) = weak.upgrade() else {
                            debug!("view dropped before its query settled");
                            return;
                        };
                        match result {
                            Ok(()) => core.borrow_mut().set_status(QueryStatus::Complete, None),
                            Err(err) => core
                                .borrow_mut()
                                .set_status(QueryStatus::Error, Some(QueryError::from(&err))),
                        }
                        notify(&core);
                    })
                    .map_err(|err| Error::spawn(err.to_string()))?;
            }
        }

        {
            let state = core.borrow();
            debug!(
                "built view over '{}': {} rows, {}",
                state.schema.table_name(),
                state.root.relationship(ROOT_RELATIONSHIP).map_or(0, |slot| slot.len()),
                state.status
            );
        }

        Ok(View {
            core,
            on_destroy: self.on_destroy,
            update_ttl: self.update_ttl,
        })
    }
}

/// A materialized, incrementally maintained query result.
pub struct View {
    core: Rc<RefCell<ViewCore>>,
    on_destroy: Option<Box<dyn FnOnce()>>,
    update_ttl: Option<Box<dyn Fn(Ttl)>>,
}

impl View {
    /// Returns a snapshot of the current result.
    pub fn data(&self) -> Data {
        self.core.borrow().data()
    }

    /// Returns the completion status.
    pub fn status(&self) -> QueryStatus {
        self.core.borrow().status
    }

    /// Returns the query error while the status is `Error`.
    pub fn error(&self) -> Option<QueryError> {
        self.core.borrow().error.clone()
    }

    /// Returns data, status and error together.
    pub fn snapshot(&self) -> Snapshot {
        self.core.borrow().snapshot()
    }

    /// Applies one change at the root.
    pub fn push(&self, change: Change) -> Result<()> {
        push_change(&self.core, change)
    }

    /// Returns another output handle onto this view.
    pub fn output(&self) -> ViewOutput {
        ViewOutput {
            core: Rc::downgrade(&self.core),
        }
    }

    /// Subscribes to snapshots published after each change and each
    /// completion status change.
    ///
    /// Callbacks may read the view, subscribe or unsubscribe. A
    /// subscription added during a notification first hears the next one.
    pub fn subscribe<F: Fn(&Snapshot) + 'static>(&self, callback: F) -> SubscriptionId {
        self.core.borrow_mut().subscriptions.subscribe(callback)
    }

    /// Removes a subscription; returns false if it was not found.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.core.borrow_mut().subscriptions.unsubscribe(id)
    }

    /// Returns the number of subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.core.borrow().subscriptions.len()
    }

    /// Forwards a TTL change to the configured delegate unchanged.
    pub fn update_ttl(&self, ttl: Ttl) {
        debug!("view over '{}': ttl {}", self.core.borrow().schema.table_name(), ttl);
        if let Some(update_ttl) = &self.update_ttl {
            update_ttl(ttl);
        }
    }

    /// Tears the view down and runs the destruction callback.
    pub fn destroy(mut self) {
        debug!("destroying view over '{}'", self.core.borrow().schema.table_name());
        self.core.borrow_mut().subscriptions.clear();
        if let Some(on_destroy) = self.on_destroy.take() {
            on_destroy();
        }
    }
}

impl Output for View {
    fn push(&mut self, change: Change) -> Result<()> {
        push_change(&self.core, change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complete::completion;
    use crate::status::{ErrorKind, ErroredQuery};
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;
    use futures::executor::LocalPool;
    use trellis_core::schema::SourceSchemaBuilder;
    use trellis_core::Row;
    use trellis_incremental::{Node, SnapshotInput};

    fn table_schema() -> SourceSchema {
        SourceSchemaBuilder::new("table")
            .unwrap()
            .primary_key(&["a"])
            .unwrap()
            .build()
            .unwrap()
    }

    fn ab(a: i64, b: &str) -> Node {
        Node::new(Row::new().with("a", a).with("b", b))
    }

    fn table_input(nodes: Vec<Node>) -> SnapshotInput {
        SnapshotInput::new(table_schema(), nodes)
    }

    #[test]
    fn test_hydrate_plural() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![ab(2, "b"), ab(1, "a"), ab(3, "c")]);
        let view = ViewBuilder::new(Format::plural())
            .build(&mut input, &pool.spawner())
            .unwrap();

        assert_eq!(
            view.data().to_string(),
            r#"[{"a":1,"b":"a"},{"a":2,"b":"b"},{"a":3,"b":"c"}]"#
        );
        assert_eq!(view.status(), QueryStatus::Complete);
        assert_eq!(view.error(), None);
        assert!(input.has_output());
    }

    #[test]
    fn test_hydrate_singular() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![ab(1, "a")]);
        let view = ViewBuilder::new(Format::singular())
            .build(&mut input, &pool.spawner())
            .unwrap();
        assert_eq!(view.data().to_string(), r#"{"a":1,"b":"a"}"#);

        let mut input = table_input(vec![]);
        let view = ViewBuilder::new(Format::singular())
            .build(&mut input, &pool.spawner())
            .unwrap();
        assert_eq!(view.data().to_string(), "null");
        assert!(view.data().as_singular().is_none());
    }

    #[test]
    fn test_hydrate_skips_yields() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![ab(1, "a"), ab(2, "b")]).with_yields(true);
        let view = ViewBuilder::new(Format::plural())
            .build(&mut input, &pool.spawner())
            .unwrap();
        assert_eq!(view.data().as_plural().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_hydrate_rejects_second_singular_row() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![ab(1, "a"), ab(2, "b")]);
        let err = ViewBuilder::new(Format::singular())
            .build(&mut input, &pool.spawner())
            .err()
            .unwrap();
        assert_eq!(err, Error::singular_conflict(ROOT_RELATIONSHIP));
        assert!(!input.has_output());
    }

    #[test]
    fn test_push_through_input() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![ab(1, "a")]);
        let view = ViewBuilder::new(Format::plural())
            .build(&mut input, &pool.spawner())
            .unwrap();
        let before = view.data();

        input.push(Change::add(ab(2, "b"))).unwrap();
        input.push(Change::edit(ab(1, "a"), ab(1, "z"))).unwrap();

        assert_eq!(
            view.data().to_string(),
            r#"[{"a":1,"b":"z"},{"a":2,"b":"b"}]"#
        );
        // Snapshots taken earlier never change.
        assert_eq!(before.to_string(), r#"[{"a":1,"b":"a"}]"#);
    }

    #[test]
    fn test_push_rejects_missing_row() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let view = ViewBuilder::new(Format::plural())
            .build(&mut input, &pool.spawner())
            .unwrap();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        view.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));

        let err = view.push(Change::remove(ab(1, "a"))).unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_subscribers_see_each_push() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let view = ViewBuilder::new(Format::plural())
            .build(&mut input, &pool.spawner())
            .unwrap();

        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(vec![]));
        let seen_clone = seen.clone();
        let id = view.subscribe(move |snapshot| {
            seen_clone.borrow_mut().push(snapshot.data.to_string());
        });
        assert_eq!(view.subscription_count(), 1);

        view.push(Change::add(ab(1, "a"))).unwrap();
        input.push(Change::add(ab(2, "b"))).unwrap();
        assert!(view.unsubscribe(id));
        view.push(Change::remove(ab(1, "a"))).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                String::from(r#"[{"a":1,"b":"a"}]"#),
                String::from(r#"[{"a":1,"b":"a"},{"a":2,"b":"b"}]"#),
            ]
        );
        assert_eq!(view.data().to_string(), r#"[{"a":2,"b":"b"}]"#);
    }

    #[test]
    fn test_subscriber_unsubscribes_itself() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let view = Rc::new(
            ViewBuilder::new(Format::plural())
                .build(&mut input, &pool.spawner())
                .unwrap(),
        );

        let calls = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let id = {
            let weak = Rc::downgrade(&view);
            let calls = calls.clone();
            let own_id = own_id.clone();
            view.subscribe(move |_| {
                calls.set(calls.get() + 1);
                if let (Some(view), Some(id)) = (weak.upgrade(), own_id.get()) {
                    assert!(view.unsubscribe(id));
                    assert_eq!(view.data().as_plural().map(<[_]>::len), Some(1));
                }
            })
        };
        own_id.set(Some(id));

        view.push(Change::add(ab(1, "a"))).unwrap();
        view.push(Change::add(ab(2, "b"))).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(view.subscription_count(), 0);
    }

    #[test]
    fn test_subscriber_subscribes_another() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let view = Rc::new(
            ViewBuilder::new(Format::plural())
                .build(&mut input, &pool.spawner())
                .unwrap(),
        );

        let late_calls = Rc::new(Cell::new(0));
        let added = Rc::new(Cell::new(false));
        {
            let weak = Rc::downgrade(&view);
            let late_calls = late_calls.clone();
            view.subscribe(move |_| {
                if added.replace(true) {
                    return;
                }
                if let Some(view) = weak.upgrade() {
                    let late_calls = late_calls.clone();
                    view.subscribe(move |_| late_calls.set(late_calls.get() + 1));
                }
            });
        }

        view.push(Change::add(ab(1, "a"))).unwrap();
        assert_eq!(view.subscription_count(), 2);
        assert_eq!(late_calls.get(), 0);

        view.push(Change::add(ab(2, "b"))).unwrap();
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_transaction_commit_batches_notifications() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let commit: Rc<RefCell<Option<CommitCallback>>> = Rc::new(RefCell::new(None));
        let commit_clone = commit.clone();
        let view = ViewBuilder::new(Format::plural())
            .on_transaction_commit(move |callback| {
                *commit_clone.borrow_mut() = Some(callback);
            })
            .build(&mut input, &pool.spawner())
            .unwrap();
        assert!(commit.borrow().is_some());

        let seen = Rc::new(RefCell::new(vec![]));
        let seen_clone = seen.clone();
        view.subscribe(move |snapshot| {
            seen_clone.borrow_mut().push(snapshot.data.as_plural().map_or(0, <[_]>::len));
        });

        view.push(Change::add(ab(1, "a"))).unwrap();
        view.push(Change::add(ab(2, "b"))).unwrap();
        assert!(seen.borrow().is_empty());

        let run_commit = || (commit.borrow().as_ref().unwrap())();
        run_commit();
        assert_eq!(*seen.borrow(), vec![2]);

        // Nothing changed since the last commit.
        run_commit();
        assert_eq!(*seen.borrow(), vec![2]);

        drop(view);
        run_commit();
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_errored_at_construction() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![ab(1, "a")]);
        let err = ErroredQuery::new(ErrorKind::App, "q1").with_name("Boom").with_details("trace");
        let view = ViewBuilder::new(Format::plural())
            .query_complete(QueryComplete::Errored(err))
            .build(&mut input, &pool.spawner())
            .unwrap();

        assert_eq!(view.status(), QueryStatus::Error);
        assert_eq!(
            view.error(),
            Some(QueryError {
                kind: ErrorKind::App,
                message: String::from("Boom"),
                details: Some(String::from("trace")),
            })
        );
        // The hydrated data is still there.
        assert_eq!(view.data().as_plural().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_pending_then_complete() {
        let mut pool = LocalPool::new();
        let mut input = table_input(vec![ab(1, "a")]);
        let (resolver, complete) = completion();
        let view = ViewBuilder::new(Format::plural())
            .query_complete(complete)
            .build(&mut input, &pool.spawner())
            .unwrap();

        let statuses = Rc::new(RefCell::new(vec![]));
        let statuses_clone = statuses.clone();
        view.subscribe(move |snapshot| statuses_clone.borrow_mut().push(snapshot.status));

        pool.run_until_stalled();
        assert_eq!(view.status(), QueryStatus::Unknown);

        resolver.resolve();
        pool.run_until_stalled();
        assert_eq!(view.status(), QueryStatus::Complete);
        assert_eq!(view.error(), None);
        assert_eq!(*statuses.borrow(), vec![QueryStatus::Complete]);
    }

    #[test]
    fn test_pending_then_error() {
        let mut pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let (resolver, complete) = completion();
        let view = ViewBuilder::new(Format::plural())
            .query_complete(complete)
            .build(&mut input, &pool.spawner())
            .unwrap();

        resolver.reject(ErroredQuery::new(ErrorKind::Parse, "q1").with_message("bad filter"));
        pool.run_until_stalled();

        assert_eq!(view.status(), QueryStatus::Error);
        let error = view.error().unwrap();
        assert_eq!(error.kind, ErrorKind::Parse);
        assert_eq!(error.message, "bad filter");
        assert_eq!(error.details, None);
    }

    #[test]
    fn test_never_settling_stays_unknown() {
        let mut pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let view = ViewBuilder::new(Format::plural())
            .query_complete(false)
            .build(&mut input, &pool.spawner())
            .unwrap();
        pool.run_until_stalled();
        assert_eq!(view.status(), QueryStatus::Unknown);
    }

    #[test]
    fn test_completion_after_drop_is_ignored() {
        let mut pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let (resolver, complete) = completion();
        let view = ViewBuilder::new(Format::plural())
            .query_complete(complete)
            .build(&mut input, &pool.spawner())
            .unwrap();
        let output = view.output();
        assert!(output.is_attached());

        drop(view);
        assert!(!output.is_attached());
        resolver.resolve();
        pool.run_until_stalled();

        // Changes pushed to a dropped view are discarded.
        input.push(Change::add(ab(1, "a"))).unwrap();
    }

    #[test]
    fn test_destroy_runs_callback_once() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let view = ViewBuilder::new(Format::plural())
            .on_destroy(move || calls_clone.set(calls_clone.get() + 1))
            .build(&mut input, &pool.spawner())
            .unwrap();
        view.subscribe(|_| {});

        assert_eq!(calls.get(), 0);
        view.destroy();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_update_ttl_delegates() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let ttls = Rc::new(RefCell::new(vec![]));
        let ttls_clone = ttls.clone();
        let view = ViewBuilder::new(Format::plural())
            .update_ttl(move |ttl| ttls_clone.borrow_mut().push(ttl))
            .build(&mut input, &pool.spawner())
            .unwrap();

        view.update_ttl(Ttl::from_millis(1_000));
        view.update_ttl(Ttl::Forever);
        view.update_ttl("1h".parse().unwrap());
        assert_eq!(
            *ttls.borrow(),
            vec![Ttl::from_millis(1_000), Ttl::Forever, Ttl::from_millis(3_600_000)]
        );

        // Without a delegate the update is a no-op.
        let view = ViewBuilder::new(Format::plural())
            .build(&mut table_input(vec![]), &pool.spawner())
            .unwrap();
        view.update_ttl(Ttl::None);
    }

    #[test]
    fn test_with_ids() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![ab(1, "a")]);
        let view = ViewBuilder::new(Format::plural())
            .with_ids(true)
            .build(&mut input, &pool.spawner())
            .unwrap();
        let data = view.data();
        assert_eq!(data.as_plural().unwrap()[0].id(), Some("1"));
    }

    fn tree_schema(depth: usize) -> SourceSchema {
        let builder = SourceSchemaBuilder::new("tree")
            .unwrap()
            .primary_key(&["id"])
            .unwrap();
        let builder = if depth > 0 {
            builder.relationship("children", tree_schema(depth - 1))
        } else {
            builder
        };
        builder.build().unwrap()
    }

    #[test]
    fn test_recursive_tree_through_view() {
        let pool = LocalPool::new();
        let row = |id: i64, child: Option<i64>| Row::new().with("id", id).with("childID", child);
        let two_as_child = Node::new(row(2, None)).with_children("children", vec![]);
        let one = Node::new(row(1, Some(2))).with_children("children", vec![two_as_child.clone()]);
        let two = Node::new(row(2, None)).with_children("children", vec![]);

        let mut input = SnapshotInput::new(tree_schema(2), vec![one.clone(), two.clone()]);
        let format = Format::plural().with_relationship(
            "children",
            Format::plural().with_relationship("children", Format::plural()),
        );
        let view = ViewBuilder::new(format)
            .build(&mut input, &pool.spawner())
            .unwrap();
        assert_eq!(
            view.data().to_string(),
            r#"[{"childID":2,"children":[{"childID":null,"children":[],"id":2}],"id":1},{"childID":null,"children":[],"id":2}]"#
        );

        input
            .push(Change::child(one, "children", Change::remove(two_as_child)))
            .unwrap();
        input.push(Change::remove(two)).unwrap();
        assert_eq!(view.data().to_string(), r#"[{"childID":2,"children":[],"id":1}]"#);
    }

    #[test]
    fn test_leaf_edit_through_hidden_level() {
        let pool = LocalPool::new();
        let label_schema = SourceSchemaBuilder::new("label")
            .unwrap()
            .primary_key(&["id"])
            .unwrap()
            .build()
            .unwrap();
        let junction_schema = SourceSchemaBuilder::new("issueLabel")
            .unwrap()
            .primary_key(&["issueID", "labelID"])
            .unwrap()
            .hidden(true)
            .relationship("labels", label_schema)
            .build()
            .unwrap();
        let schema = SourceSchemaBuilder::new("issue")
            .unwrap()
            .primary_key(&["id"])
            .unwrap()
            .relationship("labels", junction_schema)
            .build()
            .unwrap();

        let label = |name: &str| Node::new(Row::new().with("id", 1).with("name", name));
        let junction = Node::new(Row::new().with("issueID", 1).with("labelID", 1))
            .with_children("labels", vec![label("label")]);
        let issue = Node::new(Row::new().with("id", 1).with("name", "issue"))
            .with_children("labels", vec![junction.clone()]);

        let mut input = SnapshotInput::new(schema, vec![issue.clone()]);
        let view = ViewBuilder::new(Format::plural().with_relationship("labels", Format::plural()))
            .build(&mut input, &pool.spawner())
            .unwrap();
        assert_eq!(
            view.data().to_string(),
            r#"[{"id":1,"labels":[{"id":1,"name":"label"}],"name":"issue"}]"#
        );

        input
            .push(Change::child(
                issue,
                "labels",
                Change::child(junction, "labels", Change::edit(label("label"), label("renamed"))),
            ))
            .unwrap();
        assert_eq!(
            view.data().to_string(),
            r#"[{"id":1,"labels":[{"id":1,"name":"renamed"}],"name":"issue"}]"#
        );
    }

    #[test]
    fn test_view_as_output() {
        let pool = LocalPool::new();
        let mut input = table_input(vec![]);
        let mut view = ViewBuilder::new(Format::plural())
            .build(&mut input, &pool.spawner())
            .unwrap();
        let output: &mut dyn Output = &mut view;
        output.push(Change::add(ab(1, "a"))).unwrap();
        assert_eq!(view.snapshot().data.to_string(), r#"[{"a":1,"b":"a"}]"#);
    }
}
