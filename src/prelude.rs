//! Athfal prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError, CartLine, MalformedCart, clamp_to_stock,
        storage::{CartStorage, FileCartStorage, MemoryCartStorage, StorageError},
        store::CartStore,
    },
    currency::{Locale, Rupiah},
    fixtures::{Fixture, FixtureError},
    orders::{
        CustomerDetails, OrderDraft, OrderError, OrderItemSnapshot, OrderStatus, PaymentMethod,
        validate_checkout,
    },
    pricing::{PricedCart, PricedLine, PricingError, Totals, price_cart},
    products::{Catalog, Product, ProductCategory, ProductError, ProductId, TaxRate},
    promotions::{
        DiscountPercentage, PromoCode, PromoScope, PromotionError,
        validation::{PromoCodeError, PromoWarning, ValidatedPromo, validate_promo_code},
    },
    receipt::{ReceiptError, write_receipt},
    settings::{SettingsError, StorefrontSettings},
};
