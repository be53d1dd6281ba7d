//! `Inspect` implementations for the standard library.
//!
//! Scalars answer `as_scalar`; wrappers forward to what they wrap; sequences,
//! sets, maps and tuples enumerate their contents.

use std::any::TypeId;
use std::borrow::Cow;
use std::cell::{OnceCell, RefCell};
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, LinkedList, VecDeque};
use std::ffi::{OsStr, OsString};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::Duration;

use crate::error::{InspectError, Result};
use crate::inspect::{Identity, Inspect, Layout, LayoutKind, VisitElement, VisitEntry, VisitMember};
use crate::scalar::{Scalar, SignedDuration};

// --- SCALARS ---

macro_rules! impl_scalar {
    ($($t:ty => |$v:ident| $e:expr),* $(,)?) => {
        $(
            impl Inspect for $t {
                fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
                    let $v = self;
                    Some(Ok($e))
                }
            }
        )*
    };
}

macro_rules! impl_int {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl Inspect for $t {
                fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
                    Some(Ok(Scalar::$variant(*self as $wide)))
                }
            }
        )*
    };
}

impl_int!(Int as i128: i8, i16, i32, i64, i128, isize);
impl_int!(UInt as u128: u8, u16, u32, u64, u128, usize);

impl_scalar! {
    f32 => |v| Scalar::Float(f64::from(*v)),
    f64 => |v| Scalar::Float(*v),
    bool => |v| Scalar::Bool(*v),
    char => |v| Scalar::Char(*v),
    str => |v| Scalar::Str(Cow::Borrowed(v)),
    String => |v| Scalar::Str(Cow::Borrowed(v.as_str())),
    Cow<'_, str> => |v| Scalar::Str(Cow::Borrowed(v.as_ref())),
    () => |_v| Scalar::Text(Cow::Borrowed("()")),
    Duration => |v| Scalar::Duration(SignedDuration::positive(*v)),
    TypeId => |v| Scalar::Text(Cow::Owned(format!("{v:?}"))),
    Path => |v| Scalar::Text(v.to_string_lossy()),
    PathBuf => |v| Scalar::Text(v.to_string_lossy()),
    OsStr => |v| Scalar::Text(v.to_string_lossy()),
    OsString => |v| Scalar::Text(v.to_string_lossy()),
    AtomicBool => |v| Scalar::Bool(v.load(Ordering::Relaxed)),
    AtomicI32 => |v| Scalar::Int(i128::from(v.load(Ordering::Relaxed))),
    AtomicI64 => |v| Scalar::Int(i128::from(v.load(Ordering::Relaxed))),
    AtomicU32 => |v| Scalar::UInt(u128::from(v.load(Ordering::Relaxed))),
    AtomicU64 => |v| Scalar::UInt(u128::from(v.load(Ordering::Relaxed))),
    AtomicUsize => |v| Scalar::UInt(v.load(Ordering::Relaxed) as u128),
}

macro_rules! impl_display_text {
    ($($t:ty),*) => {
        $(
            impl Inspect for $t {
                fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
                    Some(Ok(Scalar::Text(Cow::Owned(self.to_string()))))
                }
            }
        )*
    };
}

impl_display_text!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6);

/// A raw address, unless it points to another raw pointer.
fn pointer_scalar<T: ?Sized>(address: usize) -> Result<Scalar<'static>> {
    let pointee = std::any::type_name::<T>();
    if pointee.starts_with("*const ") || pointee.starts_with("*mut ") {
        return Err(InspectError::unsupported(format!(
            "multi-level pointer indirection ({pointee})"
        )));
    }
    Ok(Scalar::Pointer(address))
}

impl<T: ?Sized> Inspect for *const T {
    fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
        Some(pointer_scalar::<T>(self.cast::<()>() as usize))
    }
}

impl<T: ?Sized> Inspect for *mut T {
    fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
        Some(pointer_scalar::<T>(self.cast::<()>() as usize))
    }
}

impl<T: ?Sized> Inspect for NonNull<T> {
    fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
        Some(pointer_scalar::<T>(self.as_ptr().cast::<()>() as usize))
    }
}

// --- WRAPPERS ---

/// Forwards every hook except `identity` to `$inner`, a `&U` computed from
/// `$this`.
macro_rules! delegate_hooks {
    ($this:ident => $inner:expr) => {
        fn type_name(&self) -> &'static str {
            let $this = self;
            Inspect::type_name($inner)
        }

        fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
            let $this = self;
            Inspect::as_scalar($inner)
        }

        fn is_error(&self) -> bool {
            let $this = self;
            Inspect::is_error($inner)
        }

        fn len_hint(&self) -> Option<usize> {
            let $this = self;
            Inspect::len_hint($inner)
        }

        fn entries(&self, visit: &mut VisitEntry<'_>) -> Option<Result<()>> {
            let $this = self;
            Inspect::entries($inner, visit)
        }

        fn elements(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
            let $this = self;
            Inspect::elements($inner, visit)
        }

        fn positional(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
            let $this = self;
            Inspect::positional($inner, visit)
        }

        fn layout(&self) -> Option<&'static Layout> {
            let $this = self;
            Inspect::layout($inner)
        }

        fn member(&self, index: usize, visit: &mut VisitMember<'_>) {
            let $this = self;
            Inspect::member($inner, index, visit)
        }

        fn custom_text(&self) -> Option<String> {
            let $this = self;
            Inspect::custom_text($inner)
        }
    };
}

impl<T: Inspect + ?Sized> Inspect for &T {
    delegate_hooks!(this => &**this);

    fn identity(&self) -> Option<Identity> {
        (**self).identity().or(Some(Identity::of(*self)))
    }
}

impl<T: Inspect + ?Sized> Inspect for &mut T {
    delegate_hooks!(this => &**this);

    fn identity(&self) -> Option<Identity> {
        (**self).identity().or(Some(Identity::of(&**self)))
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    delegate_hooks!(this => &**this);

    fn identity(&self) -> Option<Identity> {
        (**self).identity()
    }
}

impl<T: Inspect + ?Sized> Inspect for Rc<T> {
    delegate_hooks!(this => &**this);

    fn identity(&self) -> Option<Identity> {
        Some(Identity::of(&**self))
    }
}

impl<T: Inspect + ?Sized> Inspect for Arc<T> {
    delegate_hooks!(this => &**this);

    fn identity(&self) -> Option<Identity> {
        Some(Identity::of(&**self))
    }
}

/// Forwards to the value of `$opt`, an `Option<&U>`; an empty slot is null.
macro_rules! optional_hooks {
    ($this:ident => $opt:expr) => {
        fn type_name(&self) -> &'static str {
            let $this = self;
            $opt.map_or(std::any::type_name::<Self>(), Inspect::type_name)
        }

        fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
            let $this = self;
            match $opt {
                Some(value) => value.as_scalar(),
                None => Some(Ok(Scalar::Null)),
            }
        }

        fn identity(&self) -> Option<Identity> {
            let $this = self;
            $opt.and_then(Inspect::identity)
        }

        fn is_error(&self) -> bool {
            let $this = self;
            $opt.is_some_and(Inspect::is_error)
        }

        fn len_hint(&self) -> Option<usize> {
            let $this = self;
            $opt.and_then(Inspect::len_hint)
        }

        fn entries(&self, visit: &mut VisitEntry<'_>) -> Option<Result<()>> {
            let $this = self;
            $opt.and_then(|value| value.entries(visit))
        }

        fn elements(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
            let $this = self;
            $opt.and_then(|value| value.elements(visit))
        }

        fn positional(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
            let $this = self;
            $opt.and_then(|value| value.positional(visit))
        }

        fn layout(&self) -> Option<&'static Layout> {
            let $this = self;
            $opt.and_then(Inspect::layout)
        }

        fn member(&self, index: usize, visit: &mut VisitMember<'_>) {
            let $this = self;
            if let Some(value) = $opt {
                value.member(index, visit);
            }
        }

        fn custom_text(&self) -> Option<String> {
            let $this = self;
            $opt.and_then(Inspect::custom_text)
        }
    };
}

impl<T: Inspect> Inspect for Option<T> {
    optional_hooks!(this => this.as_ref());
}

impl<T: Inspect> Inspect for OnceCell<T> {
    optional_hooks!(this => this.get());
}

impl<T: Inspect> Inspect for OnceLock<T> {
    optional_hooks!(this => this.get());
}

/// Forwards through a guard obtained from `$guard`, a `Result<G>` where `G`
/// dereferences to the inner value. A guard that cannot be obtained turns
/// into an `InvalidOperation` error; scalars are detached from the guard.
macro_rules! guarded_hooks {
    ($this:ident => $guard:expr) => {
        fn type_name(&self) -> &'static str {
            let $this = self;
            match $guard {
                Ok(inner) => Inspect::type_name(&*inner),
                Err(_) => std::any::type_name::<Self>(),
            }
        }

        fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
            let $this = self;
            match $guard {
                Ok(inner) => Inspect::as_scalar(&*inner).map(|r| r.map(Scalar::into_owned)),
                Err(err) => Some(Err(err)),
            }
        }

        fn is_error(&self) -> bool {
            let $this = self;
            $guard.is_ok_and(|inner| Inspect::is_error(&*inner))
        }

        fn len_hint(&self) -> Option<usize> {
            let $this = self;
            $guard.ok().and_then(|inner| Inspect::len_hint(&*inner))
        }

        fn entries(&self, visit: &mut VisitEntry<'_>) -> Option<Result<()>> {
            let $this = self;
            match $guard {
                Ok(inner) => Inspect::entries(&*inner, visit),
                Err(err) => Some(Err(err)),
            }
        }

        fn elements(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
            let $this = self;
            match $guard {
                Ok(inner) => Inspect::elements(&*inner, visit),
                Err(err) => Some(Err(err)),
            }
        }

        fn positional(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
            let $this = self;
            match $guard {
                Ok(inner) => Inspect::positional(&*inner, visit),
                Err(err) => Some(Err(err)),
            }
        }

        fn layout(&self) -> Option<&'static Layout> {
            let $this = self;
            $guard.ok().and_then(|inner| Inspect::layout(&*inner))
        }

        fn member(&self, index: usize, visit: &mut VisitMember<'_>) {
            let $this = self;
            match $guard {
                Ok(inner) => Inspect::member(&*inner, index, visit),
                Err(err) => visit(Err(err)),
            }
        }

        fn custom_text(&self) -> Option<String> {
            let $this = self;
            $guard.ok().and_then(|inner| Inspect::custom_text(&*inner))
        }
    };
}

fn dropped() -> InspectError {
    InspectError::invalid_operation("weak reference target was dropped")
}

impl<T: Inspect + ?Sized> Inspect for RefCell<T> {
    guarded_hooks!(this => this.try_borrow().map_err(InspectError::from));
}

impl<T: Inspect + ?Sized> Inspect for Mutex<T> {
    guarded_hooks!(this => this.try_lock().map_err(InspectError::from));
}

impl<T: Inspect + ?Sized> Inspect for RwLock<T> {
    guarded_hooks!(this => this.try_read().map_err(InspectError::from));
}

impl<T: Inspect + ?Sized> Inspect for std::rc::Weak<T> {
    guarded_hooks!(this => this.upgrade().ok_or_else(dropped));

    fn identity(&self) -> Option<Identity> {
        Some(Identity::from_ptr(self.as_ptr()))
    }
}

impl<T: Inspect + ?Sized> Inspect for std::sync::Weak<T> {
    guarded_hooks!(this => this.upgrade().ok_or_else(dropped));

    fn identity(&self) -> Option<Identity> {
        Some(Identity::from_ptr(self.as_ptr()))
    }
}

// --- COLLECTIONS ---

fn each<'a, T: Inspect + 'a>(
    items: impl IntoIterator<Item = &'a T>,
    visit: &mut VisitElement<'_>,
) -> Option<Result<()>> {
    for item in items {
        if visit(item).is_break() {
            break;
        }
    }
    Some(Ok(()))
}

fn each_entry<'a, K: Inspect + 'a, V: Inspect + 'a>(
    entries: impl IntoIterator<Item = (&'a K, &'a V)>,
    visit: &mut VisitEntry<'_>,
) -> Option<Result<()>> {
    for (key, value) in entries {
        if visit(key, value).is_break() {
            break;
        }
    }
    Some(Ok(()))
}

macro_rules! impl_sequence {
    ($($ty:ident),*) => {
        $(
            impl<T: Inspect> Inspect for $ty<T> {
                fn len_hint(&self) -> Option<usize> {
                    Some(self.len())
                }

                fn elements(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
                    each(self.iter(), visit)
                }
            }
        )*
    };
}

impl_sequence!(Vec, VecDeque, LinkedList, BinaryHeap, BTreeSet);

impl<T: Inspect> Inspect for [T] {
    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }

    fn elements(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
        each(self.iter(), visit)
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn len_hint(&self) -> Option<usize> {
        Some(N)
    }

    fn elements(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
        each(self.iter(), visit)
    }
}

impl<T: Inspect, S> Inspect for HashSet<T, S> {
    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }

    fn elements(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
        each(self.iter(), visit)
    }
}

impl<K: Inspect, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }

    fn entries(&self, visit: &mut VisitEntry<'_>) -> Option<Result<()>> {
        each_entry(self.iter(), visit)
    }
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }

    fn entries(&self, visit: &mut VisitEntry<'_>) -> Option<Result<()>> {
        each_entry(self.iter(), visit)
    }
}

macro_rules! impl_tuple {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Inspect),+> Inspect for ($($name,)+) {
            fn len_hint(&self) -> Option<usize> {
                Some([$(stringify!($name)),+].len())
            }

            fn positional(&self, visit: &mut VisitElement<'_>) -> Option<Result<()>> {
                $(
                    if let ControlFlow::Break(()) = visit(&self.$idx) {
                        return Some(Ok(()));
                    }
                )+
                Some(Ok(()))
            }
        }
    };
}

impl_tuple!(A.0);
impl_tuple!(A.0, B.1);
impl_tuple!(A.0, B.1, C.2);
impl_tuple!(A.0, B.1, C.2, D.3);
impl_tuple!(A.0, B.1, C.2, D.3, E.4);
impl_tuple!(A.0, B.1, C.2, D.3, E.4, F.5);
impl_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);

// --- ERRORS ---

static ERROR_LAYOUT: Layout = Layout {
    name: "InspectError",
    kind: LayoutKind::Struct,
    members: &["kind", "message"],
    custom_text: false,
};

impl Inspect for InspectError {
    fn is_error(&self) -> bool {
        true
    }

    fn layout(&self) -> Option<&'static Layout> {
        Some(&ERROR_LAYOUT)
    }

    fn member(&self, index: usize, visit: &mut VisitMember<'_>) {
        match index {
            0 => {
                let kind = self.kind_name();
                visit(Ok(&kind));
            }
            1 => {
                let message = self.message();
                visit(Ok(&message));
            }
            _ => {}
        }
    }
}

// --- CHRONO ---

#[cfg(feature = "chrono")]
mod chrono_impls {
    use std::borrow::Cow;

    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

    use crate::error::{InspectError, Result};
    use crate::inspect::Inspect;
    use crate::scalar::{Scalar, SignedDuration};

    impl Inspect for TimeDelta {
        fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
            let duration = match self.to_std() {
                Ok(span) => Ok(SignedDuration::positive(span)),
                Err(_) => (-*self)
                    .to_std()
                    .map(SignedDuration::negative)
                    .map_err(|e| InspectError::failed(e.to_string())),
            };
            Some(duration.map(Scalar::Duration))
        }
    }

    impl Inspect for DateTime<Utc> {
        fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
            Some(Ok(Scalar::Text(Cow::Owned(self.to_rfc3339()))))
        }
    }

    impl Inspect for NaiveDate {
        fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
            Some(Ok(Scalar::Text(Cow::Owned(self.to_string()))))
        }
    }

    impl Inspect for NaiveDateTime {
        fn as_scalar(&self) -> Option<Result<Scalar<'_>>> {
            Some(Ok(Scalar::Text(Cow::Owned(self.to_string()))))
        }
    }
}
