//! Optimistic list mutation. Every mutating helper hands back the exact
//! previous list so a failed request can put it back untouched.

use crate::models::{Aire, Lectura, Mantenimiento, OtroEquipo, Umbral, Usuario};

pub trait Identified {
    fn id(&self) -> i64;
}

macro_rules! identified {
    ($($t:ty),* $(,)?) => {
        $(impl Identified for $t {
            fn id(&self) -> i64 {
                self.id
            }
        })*
    };
}

identified!(Aire, Lectura, Mantenimiento, OtroEquipo, Umbral, Usuario);

/// Removes `id` and returns the pre-removal snapshot.
pub fn remove<T: Identified + Clone>(list: &mut Vec<T>, id: i64) -> Vec<T> {
    let snapshot = list.clone();
    list.retain(|x| x.id() != id);
    snapshot
}

/// Replaces the item with the same id, or appends it.
pub fn upsert<T: Identified + Clone>(list: &mut Vec<T>, item: T) -> Vec<T> {
    let snapshot = list.clone();
    match list.iter_mut().find(|x| x.id() == item.id()) {
        Some(slot) => *slot = item,
        None => list.push(item),
    }
    snapshot
}

pub fn prepend<T: Identified + Clone>(list: &mut Vec<T>, item: T) -> Vec<T> {
    let snapshot = list.clone();
    list.retain(|x| x.id() != item.id());
    list.insert(0, item);
    snapshot
}

/// Applies `f` to the item with `id`; `None` when it is not in the list.
pub fn modify<T, F>(list: &mut Vec<T>, id: i64, f: F) -> Option<Vec<T>>
where
    T: Identified + Clone,
    F: FnOnce(&mut T),
{
    let snapshot = list.clone();
    let slot = list.iter_mut().find(|x| x.id() == id)?;
    f(slot);
    Some(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aire(id: i64) -> Aire {
        Aire {
            id,
            nombre: format!("AC-{id}"),
            ubicacion: "Sala".into(),
            fecha_instalacion: "2022-01-01".into(),
        }
    }

    #[test]
    fn remove_then_rollback_restores_exact_list() {
        let original = vec![aire(3), aire(1), aire(2)];
        let mut list = original.clone();
        let snapshot = remove(&mut list, 1);
        assert_eq!(list.iter().map(|a| a.id).collect::<Vec<_>>(), vec![3, 2]);
        list = snapshot;
        assert_eq!(list, original);
    }

    #[test]
    fn upsert_and_prepend() {
        let mut list = vec![aire(1), aire(2)];
        let mut renamed = aire(2);
        renamed.nombre = "Nuevo".into();
        upsert(&mut list, renamed);
        assert_eq!(list[1].nombre, "Nuevo");
        upsert(&mut list, aire(5));
        assert_eq!(list.len(), 3);
        prepend(&mut list, aire(9));
        assert_eq!(list[0].id, 9);
    }

    #[test]
    fn modify_missing_id_is_none() {
        let mut list = vec![aire(1)];
        assert!(modify(&mut list, 4, |a| a.nombre.clear()).is_none());
        let snap = modify(&mut list, 1, |a| a.nombre.clear()).unwrap();
        assert_eq!(snap[0].nombre, "AC-1");
        assert_eq!(list[0].nombre, "");
    }
}
