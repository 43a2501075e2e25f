use cart_store::InMemoryCartStore;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    AddItemToCart, ApplyVoucherToCart, CartItem, CartService, CustomerId, DiscountType, Money,
    ShoppingCart, UpdateCartItem, Voucher,
};

fn make_item(suffix: u32, quantity: u32) -> CartItem {
    CartItem::new(
        format!("SKU-{suffix:03}").as_str(),
        format!("Product {suffix}").as_str(),
        format!("https://img.example/{suffix}.png").as_str(),
        Money::from_cents(100 * suffix as i64),
        quantity,
    )
}

fn make_voucher() -> Voucher {
    Voucher {
        code: "BENCH10".to_string(),
        discount_type: DiscountType::Percentage,
        percentage: 10,
        value: Money::zero(),
        expiration_date: chrono::Utc::now() + chrono::Duration::days(30),
        active: true,
        first_time_use_only: false,
    }
}

fn bench_add_first_item(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/add_first_item", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = CartService::new(InMemoryCartStore::new());
                service
                    .add_item(AddItemToCart::new(CustomerId::new(), make_item(1, 2)))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_update_quantity(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = CartService::new(InMemoryCartStore::new());
    let customer_id = CustomerId::new();
    rt.block_on(async {
        service
            .add_item(AddItemToCart::new(customer_id, make_item(1, 2)))
            .await
            .unwrap();
    });

    c.bench_function("domain/update_quantity", |b| {
        let mut quantity = 1;
        b.iter(|| {
            quantity = quantity % 15 + 1;
            rt.block_on(async {
                service
                    .update_item(UpdateCartItem::new(
                        customer_id,
                        "SKU-001",
                        "SKU-001",
                        quantity,
                    ))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_full_cart_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/full_add_merge_voucher", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = CartService::new(InMemoryCartStore::new());
                let customer_id = CustomerId::new();
                service
                    .add_item(AddItemToCart::new(customer_id, make_item(1, 2)))
                    .await
                    .unwrap();
                service
                    .add_item(AddItemToCart::new(customer_id, make_item(1, 3)))
                    .await
                    .unwrap();
                service
                    .apply_voucher(ApplyVoucherToCart::new(customer_id, make_voucher()))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_cart_hydration_50_items(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = CartService::new(InMemoryCartStore::new());
    let customer_id = CustomerId::new();

    // Pre-populate 50 distinct products, then measure reload cost.
    rt.block_on(async {
        for suffix in 1..=50 {
            service
                .add_item(AddItemToCart::new(customer_id, make_item(suffix, 1)))
                .await
                .unwrap();
        }
    });

    c.bench_function("domain/hydrate_50_items", |b| {
        b.iter(|| {
            rt.block_on(async {
                let cart = service.get_cart(customer_id).await.unwrap();
                assert_eq!(cart.item_count(), 50);
            });
        });
    });
}

fn bench_recompute_totals(c: &mut Criterion) {
    let mut cart = ShoppingCart::create(CustomerId::new());
    for suffix in 1..=50 {
        cart.add_item(make_item(suffix, 1)).unwrap();
    }

    c.bench_function("domain/validate_50_items", |b| {
        b.iter(|| {
            assert!(cart.validate().is_empty());
        });
    });
}

criterion_group!(
    benches,
    bench_add_first_item,
    bench_update_quantity,
    bench_full_cart_cycle,
    bench_cart_hydration_50_items,
    bench_recompute_totals,
);
criterion_main!(benches);
