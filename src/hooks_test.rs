use super::*;
use crate::error::ErrorKind;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting_login_hook(hooks: &Hooks) -> (Arc<AtomicUsize>, Subscription) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let sub = hooks.on_login(move || {
        let c = Arc::clone(&c);
        async move {
            c.fetch_add(1, Ordering::SeqCst);
        }
    });
    (count, sub)
}

#[tokio::test]
async fn fire_login_awaits_every_hook() {
    let hooks = Hooks::new();
    let (a, _sa) = counting_login_hook(&hooks);
    let (b, _sb) = counting_login_hook(&hooks);
    hooks.fire_login().await;
    assert_eq!(a.load(Ordering::SeqCst), 1);
    assert_eq!(b.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unsubscribed_login_hook_is_not_called() {
    let hooks = Hooks::new();
    let (count, sub) = counting_login_hook(&hooks);
    sub.unsubscribe();
    hooks.fire_login().await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(hooks.is_empty());
}

#[test]
fn fire_error_passes_error_detail() {
    let hooks = Hooks::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _sub = hooks.on_error(move |err| sink.lock().unwrap().push(err.kind));

    hooks.fire_error(&AuthError::new(ErrorKind::Unauthorized, "nope", Some(401)));
    hooks.fire_error(&AuthError::new(ErrorKind::Network, "down", None));
    assert_eq!(*seen.lock().unwrap(), vec![ErrorKind::Unauthorized, ErrorKind::Network]);
}

#[test]
fn len_counts_both_kinds() {
    let hooks = Hooks::new();
    let _e = hooks.on_error(|_| {});
    let (_count, _l) = counting_login_hook(&hooks);
    assert_eq!(hooks.len(), 2);
    assert_eq!(format!("{hooks:?}"), "Hooks { on_login: 1, on_error: 1 }");
}

#[test]
fn detached_hook_survives_handle() {
    let hooks = Hooks::new();
    hooks.on_error(|_| {}).detach();
    assert_eq!(hooks.len(), 1);
}
