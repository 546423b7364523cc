use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{Context as _, anyhow};
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;
use maud::Markup;

use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
}

/// Deferred side effect produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    WriteClipboard(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    pub default_prevented: bool,
}

pub struct Event<'a, H> {
    kind: EventKind,
    target: NodeRef,
    current_target: NodeRef,
    host: &'a mut H,
    default_prevented: bool,
    deferred: Vec<Task>,
}

impl<H: Host> Event<'_, H> {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> &NodeRef {
        &self.target
    }

    /// The element the running handler was registered on.
    pub fn current_target(&self) -> &NodeRef {
        &self.current_target
    }

    pub fn host(&mut self) -> &mut H {
        &mut *self.host
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn defer(&mut self, task: Task) {
        self.deferred.push(task);
    }
}

type Handler<H> = Rc<dyn Fn(&mut Event<'_, H>)>;

struct Listener<H> {
    node: NodeRef,
    kind: EventKind,
    handler: Handler<H>,
}

pub struct Page<H> {
    document: NodeRef,
    host: RefCell<H>,
    listeners: RefCell<Vec<Listener<H>>>,
    pending: RefCell<VecDeque<Task>>,
}

impl<H: Host> Page<H> {
    pub fn parse(html: &str, host: H) -> Self {
        Self {
            document: kuchiki::parse_html().one(html),
            host: RefCell::new(host),
            listeners: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
        }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    pub fn body(&self) -> Option<NodeRef> {
        self.query("body")
    }

    pub fn host(&self) -> Ref<'_, H> {
        self.host.borrow()
    }

    pub fn host_mut(&self) -> RefMut<'_, H> {
        self.host.borrow_mut()
    }

    pub fn into_host(self) -> H {
        self.host.into_inner()
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        find_by_id(&self.document, id)
    }

    pub fn query(&self, selector: &str) -> Option<NodeRef> {
        self.document
            .select_first(selector)
            .ok()
            .map(|n| n.as_node().clone())
    }

    pub fn query_all(&self, selector: &str) -> Vec<NodeRef> {
        match self.document.select(selector) {
            Ok(nodes) => nodes.map(|n| n.as_node().clone()).collect(),
            Err(()) => {
                tracing::warn!(selector, "unsupported selector");
                Vec::new()
            }
        }
    }

    pub fn listen<F>(&self, node: &NodeRef, kind: EventKind, handler: F)
    where
        F: Fn(&mut Event<'_, H>) + 'static,
    {
        self.listeners.borrow_mut().push(Listener {
            node: node.clone(),
            kind,
            handler: Rc::new(handler),
        });
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Clicks the first element in the live document matching `selector`.
    pub fn click(&self, selector: &str) -> anyhow::Result<ClickOutcome> {
        let target = self
            .document
            .select_first(selector)
            .map_err(|()| anyhow!("no element matches {selector}"))?
            .as_node()
            .clone();
        Ok(self.dispatch(&target, EventKind::Click))
    }

    /// Bubbles from `target` up through its ancestors. The path is fixed before
    /// any handler runs, so handlers that detach nodes do not cut it short.
    /// Listeners on nodes left detached afterwards are dropped.
    pub fn dispatch(&self, target: &NodeRef, kind: EventKind) -> ClickOutcome {
        let path: Vec<NodeRef> = target.inclusive_ancestors().collect();
        let mut default_prevented = false;
        let mut deferred = Vec::new();

        for current in &path {
            // Snapshot so handlers may register listeners without a borrow conflict.
            let handlers: Vec<Handler<H>> = self
                .listeners
                .borrow()
                .iter()
                .filter(|l| l.kind == kind && l.node == *current)
                .map(|l| l.handler.clone())
                .collect();

            for handler in handlers {
                let mut host = self.host.borrow_mut();
                let mut event = Event {
                    kind,
                    target: target.clone(),
                    current_target: current.clone(),
                    host: &mut *host,
                    default_prevented,
                    deferred: Vec::new(),
                };
                handler(&mut event);
                default_prevented = event.default_prevented;
                deferred.append(&mut event.deferred);
            }
        }

        if kind == EventKind::Click && !default_prevented {
            if let Some(href) = link_href(&path) {
                tracing::debug!(%href, "following link");
                self.host.borrow_mut().navigate(&href);
            }
        }

        self.listeners
            .borrow_mut()
            .retain(|l| is_connected(&l.node));
        self.pending.borrow_mut().extend(deferred);
        ClickOutcome { default_prevented }
    }

    pub fn pending_tasks(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Runs queued tasks, returning how many completed. Failures are dropped.
    pub fn run_pending(&self) -> usize {
        let tasks: Vec<Task> = self.pending.borrow_mut().drain(..).collect();
        let mut host = self.host.borrow_mut();
        let mut completed = 0;
        for task in tasks {
            let res = match &task {
                Task::WriteClipboard(text) => host.write_clipboard(text),
            };
            match res {
                Ok(()) => completed += 1,
                Err(e) => tracing::debug!(?task, error = %format!("{e:#}"), "task failed"),
            }
        }
        completed
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.document.serialize(&mut out).context("serialize page")?;
        String::from_utf8(out).context("page html not utf-8")
    }
}

pub fn find_by_id(root: &NodeRef, id: &str) -> Option<NodeRef> {
    root.descendants().find(|node| {
        node.as_element()
            .is_some_and(|el| el.attributes.borrow().get("id") == Some(id))
    })
}

/// Builds a detached element from markup. Returns the first top-level element.
pub fn fragment(markup: Markup) -> Option<NodeRef> {
    let doc = kuchiki::parse_html().one(markup.into_string());
    let body = doc.select_first("body").ok()?;
    let node = body.as_node().children().find(|c| c.as_element().is_some())?;
    node.detach();
    Some(node)
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()?
        .attributes
        .borrow()
        .get(name)
        .map(|v| v.to_string())
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    node.as_element().is_some_and(|el| {
        el.attributes
            .borrow()
            .get("class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    })
}

pub fn add_class(node: &NodeRef, class: &str) {
    let Some(el) = node.as_element() else { return };
    let mut attrs = el.attributes.borrow_mut();
    let current = attrs.get("class").unwrap_or("").to_string();
    if current.split_ascii_whitespace().any(|c| c == class) {
        return;
    }
    let next = if current.trim().is_empty() {
        class.to_string()
    } else {
        format!("{} {}", current.trim_end(), class)
    };
    attrs.insert("class", next);
}

pub fn remove_class(node: &NodeRef, class: &str) {
    let Some(el) = node.as_element() else { return };
    let mut attrs = el.attributes.borrow_mut();
    let Some(current) = attrs.get("class").map(|v| v.to_string()) else {
        return;
    };
    let next: Vec<&str> = current
        .split_ascii_whitespace()
        .filter(|c| *c != class)
        .collect();
    attrs.insert("class", next.join(" "));
}

/// Returns whether the class is present afterwards.
pub fn toggle_class(node: &NodeRef, class: &str) -> bool {
    if has_class(node, class) {
        remove_class(node, class);
        false
    } else {
        add_class(node, class);
        true
    }
}

pub fn is_hidden(node: &NodeRef) -> bool {
    node.as_element()
        .is_some_and(|el| el.attributes.borrow().contains("hidden"))
}

pub fn set_hidden(node: &NodeRef, hidden: bool) {
    let Some(el) = node.as_element() else { return };
    let mut attrs = el.attributes.borrow_mut();
    if hidden {
        attrs.insert("hidden", String::new());
    } else {
        attrs.remove("hidden");
    }
}

/// Whether the node is still attached under a document node.
pub fn is_connected(node: &NodeRef) -> bool {
    node.inclusive_ancestors()
        .any(|n| n.as_document().is_some())
}

fn link_href(path: &[NodeRef]) -> Option<String> {
    path.iter().find_map(|node| {
        let el = node.as_element()?;
        if &*el.name.local != "a" {
            return None;
        }
        let href = el.attributes.borrow().get("href").map(|h| h.to_string());
        href
    })
}
