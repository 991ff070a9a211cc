use std::any::{TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

use super::{CollectionRef, EntityCollection};
use crate::core::{EntityObject, EntityRef, Result, TrackError};

/// Non-generic face of a collection accessor, one per navigation.
///
/// All membership operations take the candidate's backing object; `None`
/// (an entry without an object) is never a member.
pub trait ShadowCollectionAccessor: Send + Sync + fmt::Debug {
    /// Name of the concrete collection representation.
    fn collection_type(&self) -> &'static str;

    /// Name of the element type.
    fn element_type(&self) -> &'static str;

    /// True when the element type is unknown and membership is not tracked.
    fn is_target_shadow(&self) -> bool;

    /// Creates a new empty collection.
    fn create(&self) -> CollectionRef;

    /// Creates a collection holding `values`. Empty in shadow-shadow mode.
    fn create_from(&self, values: &[EntityRef]) -> Result<CollectionRef>;

    /// Adds `value` unless already present. Returns whether it was added.
    fn add(&self, collection: &CollectionRef, value: Option<&EntityRef>) -> Result<bool>;

    /// Adds every value not already present.
    fn add_range(&self, collection: &CollectionRef, values: &[EntityRef]) -> Result<()>;

    fn contains(&self, collection: &CollectionRef, value: Option<&EntityRef>) -> Result<bool>;

    /// Removes `value` if present. Returns whether it was removed; never
    /// fails for a value that is absent or of another type.
    fn remove(&self, collection: &CollectionRef, value: Option<&EntityRef>) -> Result<bool>;
}

type CreateCollection<C> = Box<dyn Fn() -> C + Send + Sync>;
type AdmitsElement = fn(&EntityRef) -> bool;

/// Accessor specialized for collection representation `C` holding `T`.
pub struct TypedCollectionAccessor<C, T: ?Sized + 'static> {
    create_collection: CreateCollection<C>,
    admits: AdmitsElement,
    target_shadow: bool,
    _element: PhantomData<fn() -> Arc<T>>,
}

impl<C, T> TypedCollectionAccessor<C, T>
where
    C: EntityCollection,
    T: ?Sized + 'static,
{
    /// `admits` decides whether an object is an instance of `T`.
    pub fn new(
        create_collection: impl Fn() -> C + Send + Sync + 'static,
        admits: AdmitsElement,
    ) -> Self {
        Self {
            create_collection: Box::new(create_collection),
            admits,
            target_shadow: TypeId::of::<T>() == TypeId::of::<dyn EntityObject>(),
            _element: PhantomData,
        }
    }

    fn with_collection<R>(
        &self,
        collection: &CollectionRef,
        f: impl FnOnce(&mut C) -> R,
    ) -> Result<R> {
        let mut guard = collection.write()?;
        let typed = guard.downcast_mut::<C>().ok_or_else(|| {
            TrackError::TypeMismatch(format!(
                "collection is not a {}",
                type_name::<C>()
            ))
        })?;
        Ok(f(typed))
    }

    fn read_collection<R>(&self, collection: &CollectionRef, f: impl FnOnce(&C) -> R) -> Result<R> {
        let guard = collection.read()?;
        let typed = guard.downcast_ref::<C>().ok_or_else(|| {
            TrackError::TypeMismatch(format!(
                "collection is not a {}",
                type_name::<C>()
            ))
        })?;
        Ok(f(typed))
    }

    fn element<'a>(&self, value: &'a EntityRef) -> Result<&'a EntityRef> {
        if (self.admits)(value) {
            Ok(value)
        } else {
            Err(TrackError::TypeMismatch(format!(
                "{} is not a {}",
                value.type_name(),
                type_name::<T>()
            )))
        }
    }

    fn elements<'a>(&self, values: &'a [EntityRef]) -> Result<Vec<&'a EntityRef>> {
        values.iter().map(|value| self.element(value)).collect()
    }
}

impl<C, T> ShadowCollectionAccessor for TypedCollectionAccessor<C, T>
where
    C: EntityCollection,
    T: ?Sized + 'static,
{
    fn collection_type(&self) -> &'static str {
        type_name::<C>()
    }

    fn element_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn is_target_shadow(&self) -> bool {
        self.target_shadow
    }

    fn create(&self) -> CollectionRef {
        Arc::new(RwLock::new((self.create_collection)()))
    }

    fn create_from(&self, values: &[EntityRef]) -> Result<CollectionRef> {
        let mut collection = (self.create_collection)();
        if !self.target_shadow {
            for value in self.elements(values)? {
                collection.insert(Arc::clone(value));
            }
        }
        let collection: CollectionRef = Arc::new(RwLock::new(collection));
        Ok(collection)
    }

    fn add(&self, collection: &CollectionRef, value: Option<&EntityRef>) -> Result<bool> {
        if self.target_shadow {
            return Ok(false);
        }
        let Some(value) = value else {
            return Ok(false);
        };
        let element = self.element(value)?;

        self.with_collection(collection, |typed| {
            if typed.contains(element) {
                false
            } else {
                typed.insert(Arc::clone(element))
            }
        })
    }

    fn add_range(&self, collection: &CollectionRef, values: &[EntityRef]) -> Result<()> {
        if self.target_shadow {
            return Ok(());
        }
        let elements = self.elements(values)?;

        self.with_collection(collection, |typed| {
            for element in elements {
                if !typed.contains(element) {
                    typed.insert(Arc::clone(element));
                }
            }
        })
    }

    fn contains(&self, collection: &CollectionRef, value: Option<&EntityRef>) -> Result<bool> {
        if self.target_shadow {
            return Ok(false);
        }
        let Some(value) = value else {
            return Ok(false);
        };
        let element = self.element(value)?;

        self.read_collection(collection, |typed| typed.contains(element))
    }

    fn remove(&self, collection: &CollectionRef, value: Option<&EntityRef>) -> Result<bool> {
        // Objects of another type can never be members.
        let Some(value) = value.filter(|value| (self.admits)(value)) else {
            return Ok(false);
        };

        self.with_collection(collection, |typed| typed.remove(value))
    }
}

impl<C, T: ?Sized + 'static> fmt::Debug for TypedCollectionAccessor<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCollectionAccessor")
            .field("collection", &type_name::<C>())
            .field("element", &type_name::<T>())
            .field("target_shadow", &self.target_shadow)
            .finish()
    }
}
