//! E2E tests for mounting components and driving their state through a host.
//!
//! Validates:
//! 1. Batched commits inside `act` cause a single re-render.
//! 2. Setters and refs keep their identity across renders.
//! 3. Hook order violations surface as errors, not wrong reads.

#![forbid(unsafe_code)]

use std::cell::Cell;
use std::rc::Rc;

use cbstate_runtime::{HookError, HookResult, Host, HostConfig, Initial, Ref, Scope, StateSetter};

#[derive(Clone)]
struct Form {
    name: String,
    set_name: StateSetter<String>,
    age: u32,
    set_age: StateSetter<u32>,
    renders: Ref<u32>,
}

fn form(cx: &mut Scope, _: &()) -> HookResult<Form> {
    let (name, set_name) = cx.use_state(String::new())?;
    let (age, set_age) = cx.use_state(Initial::lazy(|| 18))?;
    let renders = cx.use_ref(0)?;
    renders.set(renders.current() + 1);
    Ok(Form {
        name,
        set_name,
        age,
        set_age,
        renders,
    })
}

#[test]
fn batched_commits_render_once() {
    let mut host = Host::mount(form, ()).unwrap();
    assert_eq!(host.current().age, 18);

    host.act(|f| {
        f.set_name.set("Ada".into());
        f.set_age.update(|a| a + 1);
        f.set_age.update(|a| a + 1);
    })
    .unwrap();

    let current = host.current();
    assert_eq!(current.name, "Ada");
    assert_eq!(current.age, 20);
    assert_eq!(host.render_count(), 2);
    assert_eq!(current.renders.current(), 2);
}

#[test]
fn handles_are_stable_across_renders() {
    let mut host = Host::mount(form, ()).unwrap();
    let first = host.current().clone();

    host.act(|f| f.set_age.set(40)).unwrap();
    let second = host.current();

    assert!(first.set_name.ptr_eq(&second.set_name));
    assert!(first.set_age.ptr_eq(&second.set_age));
    assert!(first.renders.ptr_eq(&second.renders));
}

#[test]
fn stale_handle_still_writes_latest() {
    let mut host = Host::mount(form, ()).unwrap();
    let stale = host.current().set_age.clone();

    host.act(|f| f.set_age.set(30)).unwrap();
    host.act(|_| stale.update(|a| a * 2)).unwrap();

    assert_eq!(host.current().age, 60);
}

#[test]
fn memo_with_empty_deps_builds_once() {
    let builds = Rc::new(Cell::new(0u32));
    let builds_in = Rc::clone(&builds);
    let mut host = Host::mount(
        move |cx: &mut Scope, _: &()| {
            let (n, set) = cx.use_state(0)?;
            let builds = Rc::clone(&builds_in);
            let label = cx.use_memo((), move || {
                builds.set(builds.get() + 1);
                Rc::new(String::from("stable"))
            })?;
            Ok((n, set, label))
        },
        (),
    )
    .unwrap();

    let first_label = Rc::clone(&host.current().2);
    for i in 1..=4 {
        host.act(|(_, set, _)| set.set(i)).unwrap();
    }
    assert_eq!(host.current().0, 4);
    assert_eq!(builds.get(), 1);
    assert!(Rc::ptr_eq(&first_label, &host.current().2));
}

#[test]
fn swapping_hook_types_is_an_error() {
    let mut host = Host::mount(
        |cx: &mut Scope, swap: &bool| {
            if *swap {
                cx.use_ref(0u8)?;
            } else {
                cx.use_state(0u8)?;
            }
            Ok(())
        },
        false,
    )
    .unwrap();

    let err = host.rerender(true).unwrap_err();
    assert!(matches!(err, HookError::SlotTypeMismatch { index: 0, .. }));
}

#[test]
fn flush_limit_is_configurable() {
    let config = HostConfig::default().with_max_flush_passes(2);
    let mut host = Host::mount_with_config(
        config,
        |cx: &mut Scope, _: &()| {
            let (n, set) = cx.use_state(0u32)?;
            Ok((n, set))
        },
        (),
    )
    .unwrap();

    // Each act commits one change and needs exactly one pass.
    host.act(|(_, set)| set.set(1)).unwrap();
    assert_eq!(host.flush().unwrap(), 0);
    assert_eq!(host.config().max_flush_passes, 2);
    assert_eq!(host.current().0, 1);
}
