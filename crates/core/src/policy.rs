//! Authorization policy table.
//!
//! Every API operation has exactly one row in [`Operation::policy`]. The gate
//! evaluates a row in two steps:
//!
//! 1. [`Operation::admit`] before any state is read: is a session required,
//!    and does the caller's role qualify?
//! 2. [`Operation::check_owner`] once the target entity is loaded, for rows
//!    whose [`Ownership`] is not `None`.
//!
//! Administrators pass every `OwnerOrAdmin` check. `OwnerOnly` admits the
//! owner alone.

use crate::types::{Principal, Role, UserId};

/// Which callers may invoke an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Anyone, including anonymous callers.
    Public,
    /// Any authenticated principal.
    Session,
    /// An authenticated principal holding one of these roles.
    Roles(&'static [Role]),
}

/// Ownership relation required against the target entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    None,
    OwnerOrAdmin,
    OwnerOnly,
}

/// One row of the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub audience: Audience,
    pub ownership: Ownership,
}

impl Policy {
    const fn new(audience: Audience, ownership: Ownership) -> Self {
        Self {
            audience,
            ownership,
        }
    }
}

/// Rejection produced by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("You must be logged in to perform this action.")]
    Unauthenticated,
    #[error("You are not authorized to perform this action.")]
    Forbidden,
}

/// Every query and mutation the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Identity
    Register,
    Login,
    Me,
    User,
    Users,
    UserOrders,
    UpdateUserRole,
    // Categories
    Categories,
    Category,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    // Products
    Products,
    Product,
    FeaturedProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    // Cart
    MyCart,
    AddToCart,
    RemoveFromCart,
    UpdateCartItem,
    ClearCart,
    // Orders
    Orders,
    Order,
    MyOrders,
    CreateOrder,
    UpdateOrderStatus,
    // Reviews
    ProductReviews,
    UserReviews,
    CreateReview,
    UpdateReview,
    DeleteReview,
}

const ADMIN: &[Role] = &[Role::Admin];
const ARTISAN: &[Role] = &[Role::Artisan];

impl Operation {
    /// The policy table.
    #[must_use]
    pub const fn policy(self) -> Policy {
        use Audience::{Public, Roles, Session};
        use Ownership::{None, OwnerOnly, OwnerOrAdmin};

        match self {
            Self::Register | Self::Login => Policy::new(Public, None),
            Self::Me => Policy::new(Session, None),
            Self::User => Policy::new(Public, None),
            Self::Users => Policy::new(Roles(ADMIN), None),
            Self::UserOrders => Policy::new(Session, OwnerOrAdmin),
            Self::UpdateUserRole => Policy::new(Roles(ADMIN), None),

            Self::Categories | Self::Category => Policy::new(Public, None),
            Self::CreateCategory | Self::UpdateCategory | Self::DeleteCategory => {
                Policy::new(Roles(ADMIN), None)
            }

            Self::Products | Self::Product | Self::FeaturedProducts => Policy::new(Public, None),
            Self::CreateProduct => Policy::new(Roles(ARTISAN), None),
            Self::UpdateProduct | Self::DeleteProduct => Policy::new(Session, OwnerOrAdmin),

            Self::MyCart
            | Self::AddToCart
            | Self::RemoveFromCart
            | Self::UpdateCartItem
            | Self::ClearCart => Policy::new(Session, None),

            Self::Orders => Policy::new(Roles(ADMIN), None),
            Self::Order => Policy::new(Session, OwnerOrAdmin),
            Self::MyOrders | Self::CreateOrder => Policy::new(Session, None),
            Self::UpdateOrderStatus => Policy::new(Roles(ADMIN), None),

            Self::ProductReviews | Self::UserReviews => Policy::new(Public, None),
            Self::CreateReview => Policy::new(Session, None),
            Self::UpdateReview => Policy::new(Session, OwnerOnly),
            Self::DeleteReview => Policy::new(Session, OwnerOrAdmin),
        }
    }

    /// Check session and role requirements.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when a session is required and absent, `Forbidden`
    /// when the principal's role is not listed.
    pub fn admit(self, principal: Option<&Principal>) -> Result<(), AccessError> {
        match (self.policy().audience, principal) {
            (Audience::Public, _) => Ok(()),
            (Audience::Session | Audience::Roles(_), None) => Err(AccessError::Unauthenticated),
            (Audience::Session, Some(_)) => Ok(()),
            (Audience::Roles(roles), Some(p)) if roles.contains(&p.role) => Ok(()),
            (Audience::Roles(_), Some(_)) => Err(AccessError::Forbidden),
        }
    }

    /// Like [`admit`](Self::admit), but also hands back the principal.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when there is no principal, otherwise as `admit`.
    pub fn require(self, principal: Option<&Principal>) -> Result<&Principal, AccessError> {
        let principal = principal.ok_or(AccessError::Unauthenticated)?;
        self.admit(Some(principal))?;
        Ok(principal)
    }

    /// Check the ownership relation against the loaded target's owner.
    ///
    /// # Errors
    ///
    /// `Forbidden` when the relation does not hold.
    pub fn check_owner(self, principal: &Principal, owner: UserId) -> Result<(), AccessError> {
        let allowed = match self.policy().ownership {
            Ownership::None => true,
            Ownership::OwnerOrAdmin => principal.owns_or_admin(owner),
            Ownership::OwnerOnly => principal.id == owner,
        };
        if allowed {
            Ok(())
        } else {
            Err(AccessError::Forbidden)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn principal(id: i32, role: Role) -> Principal {
        Principal {
            id: UserId::new(id),
            email: format!("user{id}@example.com"),
            role,
        }
    }

    #[test]
    fn test_public_operations_admit_anonymous() {
        for op in [
            Operation::Products,
            Operation::Categories,
            Operation::Register,
            Operation::Login,
            Operation::ProductReviews,
        ] {
            assert_eq!(op.admit(None), Ok(()), "{op:?}");
        }
    }

    #[test]
    fn test_session_operations_reject_anonymous() {
        for op in [
            Operation::Me,
            Operation::MyCart,
            Operation::MyOrders,
            Operation::CreateOrder,
            Operation::CreateReview,
        ] {
            assert_eq!(op.admit(None), Err(AccessError::Unauthenticated), "{op:?}");
        }
    }

    #[test]
    fn test_admin_operations_reject_other_roles() {
        let buyer = principal(1, Role::Buyer);
        let artisan = principal(2, Role::Artisan);
        let admin = principal(3, Role::Admin);

        for op in [
            Operation::CreateCategory,
            Operation::UpdateOrderStatus,
            Operation::Orders,
            Operation::Users,
        ] {
            assert_eq!(op.admit(Some(&buyer)), Err(AccessError::Forbidden));
            assert_eq!(op.admit(Some(&artisan)), Err(AccessError::Forbidden));
            assert_eq!(op.admit(Some(&admin)), Ok(()));
        }
    }

    #[test]
    fn test_create_product_is_artisan_only() {
        let admin = principal(1, Role::Admin);
        let artisan = principal(2, Role::Artisan);
        assert_eq!(
            Operation::CreateProduct.admit(Some(&admin)),
            Err(AccessError::Forbidden)
        );
        assert_eq!(Operation::CreateProduct.admit(Some(&artisan)), Ok(()));
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = principal(10, Role::Artisan);
        let stranger = principal(11, Role::Artisan);
        let admin = principal(12, Role::Admin);
        let op = Operation::UpdateProduct;

        assert_eq!(op.check_owner(&owner, owner.id), Ok(()));
        assert_eq!(op.check_owner(&admin, owner.id), Ok(()));
        assert_eq!(
            op.check_owner(&stranger, owner.id),
            Err(AccessError::Forbidden)
        );
    }

    #[test]
    fn test_owner_only_excludes_admin() {
        let author = principal(1, Role::Buyer);
        let admin = principal(2, Role::Admin);
        let op = Operation::UpdateReview;

        assert_eq!(op.check_owner(&author, author.id), Ok(()));
        assert_eq!(op.check_owner(&admin, author.id), Err(AccessError::Forbidden));
        assert_eq!(Operation::DeleteReview.check_owner(&admin, author.id), Ok(()));
    }

    #[test]
    fn test_require_returns_principal() {
        let buyer = principal(5, Role::Buyer);
        assert_eq!(Operation::MyCart.require(Some(&buyer)).unwrap().id, buyer.id);
        assert_eq!(
            Operation::MyCart.require(None),
            Err(AccessError::Unauthenticated)
        );
    }
}
