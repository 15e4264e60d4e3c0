//! End-to-end reflection tests: registration, construction, member access
//! and value lifecycle.

use mirror_core::{
    create_standard_registry, AnyHandle, AnyValue, CtorNode, DataNode, DtorNode, FuncNode,
    TypeDesc, TypeRegistry, TypeTraits,
};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

#[derive(Clone, PartialEq, Debug)]
struct Point {
    x: i32,
    y: i32,
}

fn point_registry() -> TypeRegistry {
    let mut registry = create_standard_registry().unwrap();
    let i32_key = registry.key_of::<i32>().unwrap();
    let point = registry
        .register_eq::<Point>(TypeDesc::named("Point").with_traits(TypeTraits::class()))
        .unwrap();

    registry
        .link_ctor(CtorNode::nullary::<Point>(point, || Point { x: 0, y: 0 }))
        .unwrap();
    registry
        .link_ctor(CtorNode::binary::<Point, i32, i32>(
            point,
            [i32_key, i32_key],
            |x, y| Point { x, y },
        ))
        .unwrap();
    registry
        .link_data(DataNode::field::<Point, i32>(
            "x",
            point,
            i32_key,
            |p| &p.x,
            |p, v| p.x = v,
        ))
        .unwrap();
    registry
        .link_data(DataNode::field::<Point, i32>(
            "y",
            point,
            i32_key,
            |p| &p.y,
            |p, v| p.y = v,
        ))
        .unwrap();
    registry
        .link_func(FuncNode::method1::<Point, (), i32>(
            "translate_x",
            point,
            registry.key_of::<()>().unwrap(),
            [i32_key],
            |p, dx| p.x += dx,
        ))
        .unwrap();
    registry
}

#[test]
fn test_point_end_to_end() {
    let registry = point_registry();
    let point = registry.resolve::<Point>().unwrap();

    let mut value = point.construct(&[
        AnyValue::new(&registry, 1i32),
        AnyValue::new(&registry, 2i32),
    ]);
    assert!(value.is_valid());
    assert_eq!(value.info(&registry), Some(point));

    let x = point.data("x").unwrap();
    let y = point.data("y").unwrap();
    assert_eq!(x.get(value.as_handle()).try_cast::<i32>(&registry), Some(&1));
    assert_eq!(y.get(value.as_handle()).try_cast::<i32>(&registry), Some(&2));

    assert!(x.set(value.as_handle(), AnyValue::new(&registry, 10i32)));
    let translate = point.func("translate_x").unwrap();
    let ret = translate.invoke(value.as_handle(), &[AnyValue::new(&registry, 5i32)]);
    assert!(ret.is_valid());

    assert_eq!(
        value.try_cast::<Point>(&registry),
        Some(&Point { x: 15, y: 2 })
    );

    assert!(point.destroy(value.as_handle()));
}

#[test]
fn test_nullary_construction() {
    let registry = point_registry();
    let point = registry.resolve::<Point>().unwrap();

    let value = point.construct(&[]);
    assert_eq!(value.try_cast::<Point>(&registry), Some(&Point { x: 0, y: 0 }));

    // No three-argument constructor exists.
    let miss = point.construct(&[
        AnyValue::new(&registry, 1i32),
        AnyValue::new(&registry, 2i32),
        AnyValue::new(&registry, 3i32),
    ]);
    assert!(!miss.is_valid());
}

#[test]
fn test_construction_converts_arguments() {
    let registry = point_registry();
    let point = registry.resolve::<Point>().unwrap();

    // i64 arguments narrow to i32 through the registered conversions.
    let value = point.construct(&[
        AnyValue::new(&registry, 7i64),
        AnyValue::new(&registry, 8i64),
    ]);
    assert_eq!(value.try_cast::<Point>(&registry), Some(&Point { x: 7, y: 8 }));

    // Strings do not convert to i32.
    let miss = point.construct(&[
        AnyValue::new(&registry, String::from("7")),
        AnyValue::new(&registry, 8i32),
    ]);
    assert!(!miss.is_valid());
}

#[derive(Clone, PartialEq, Debug)]
struct Temperature {
    celsius: f64,
    from_int: bool,
}

#[test]
fn test_first_declared_constructor_wins() {
    let mut registry = create_standard_registry().unwrap();
    let i32_key = registry.key_of::<i32>().unwrap();
    let f64_key = registry.key_of::<f64>().unwrap();
    let temp = registry
        .register_eq::<Temperature>(
            TypeDesc::named("Temperature").with_traits(TypeTraits::class()),
        )
        .unwrap();

    // Declared first: takes f64. Declared second: takes i32 exactly.
    registry
        .link_ctor(CtorNode::unary::<Temperature, f64>(
            temp,
            [f64_key],
            |celsius| Temperature {
                celsius,
                from_int: false,
            },
        ))
        .unwrap();
    registry
        .link_ctor(CtorNode::unary::<Temperature, i32>(
            temp,
            [i32_key],
            |c| Temperature {
                celsius: c as f64,
                from_int: true,
            },
        ))
        .unwrap();

    let info = registry.resolve::<Temperature>().unwrap();

    // An i32 argument converts to f64, so the earlier candidate wins even
    // though an exact match exists later in declaration order.
    let built = info.construct(&[AnyValue::new(&registry, 21i32)]);
    let result = built.try_cast::<Temperature>(&registry).unwrap();
    assert_eq!(result.celsius, 21.0);
    assert!(!result.from_int);

    // Lookup by argument types reports the same candidate.
    let ctor = info.ctor(&[i32_key]).unwrap();
    assert_eq!(ctor.arg(0), registry.resolve::<f64>());
}

#[test]
fn test_values_survive_moves() {
    let registry = point_registry();
    let point = registry.resolve::<Point>().unwrap();

    let mut values = Vec::new();
    for i in 0..8 {
        values.push(point.construct(&[
            AnyValue::new(&registry, i),
            AnyValue::new(&registry, i * 2),
        ]));
    }
    // Growth relocated the containers; inline storage must still read back.
    for (i, value) in values.iter().enumerate() {
        let p = value.try_cast::<Point>(&registry).unwrap();
        assert_eq!(p.x, i as i32);
        assert_eq!(p.y, i as i32 * 2);
    }

    let boxed = Box::new(AnyValue::new(&registry, 42i32));
    assert_eq!(boxed.try_cast::<i32>(&registry), Some(&42));
}

static COUNTER: AtomicI32 = AtomicI32::new(0);

#[derive(Clone)]
struct Counter;

#[test]
fn test_static_members() {
    let mut registry = create_standard_registry().unwrap();
    let i32_key = registry.key_of::<i32>().unwrap();
    let counter = registry
        .register::<Counter>(TypeDesc::named("Counter").with_traits(TypeTraits::class()))
        .unwrap();

    registry
        .link_data(DataNode::static_var::<i32>(
            "value",
            counter,
            i32_key,
            || COUNTER.load(Ordering::SeqCst),
            Some(|v| COUNTER.store(v, Ordering::SeqCst)),
        ))
        .unwrap();
    registry
        .link_func(FuncNode::static_fn1::<i32, i32>(
            "bump",
            counter,
            i32_key,
            [i32_key],
            |by| COUNTER.fetch_add(by, Ordering::SeqCst) + by,
        ))
        .unwrap();

    let info = registry.resolve::<Counter>().unwrap();
    let value = info.data("value").unwrap();
    assert!(value.is_static());

    // Static members are reachable without an instance.
    assert!(value.set(AnyHandle::default(), AnyValue::new(&registry, 3i32)));
    assert_eq!(
        value
            .get(AnyHandle::default())
            .try_cast::<i32>(&registry),
        Some(&3)
    );

    let bump = info.func("bump").unwrap();
    assert!(bump.is_static());
    let result = bump.invoke(AnyHandle::default(), &[AnyValue::new(&registry, 4i32)]);
    assert_eq!(result.try_cast::<i32>(&registry), Some(&7));
    assert_eq!(COUNTER.load(Ordering::SeqCst), 7);
}

#[derive(Clone, PartialEq, Debug)]
struct Buffer {
    samples: [i32; 3],
}

#[test]
fn test_array_members() {
    let mut registry = create_standard_registry().unwrap();
    let i32_key = registry.key_of::<i32>().unwrap();
    let samples_ty = registry
        .register_eq::<[i32; 3]>(
            TypeDesc::anonymous()
                .with_traits(TypeTraits::array())
                .with_extent(3)
                .with_element(i32_key),
        )
        .unwrap();
    let buffer = registry
        .register_eq::<Buffer>(TypeDesc::named("Buffer").with_traits(TypeTraits::class()))
        .unwrap();
    registry
        .link_data(DataNode::array_field::<Buffer, i32, 3>(
            "samples",
            buffer,
            samples_ty,
            |b| &b.samples,
            |b| &mut b.samples,
        ))
        .unwrap();

    let info = registry.resolve::<Buffer>().unwrap();
    let samples = info.data("samples").unwrap();
    assert_eq!(samples.ty().unwrap().extent(), 3);
    assert_eq!(Some(samples.ty().unwrap().element()), registry.resolve::<i32>());

    let mut value = AnyValue::new(&registry, Buffer { samples: [1, 2, 3] });
    assert_eq!(
        samples
            .get_at(value.as_handle(), 1)
            .try_cast::<i32>(&registry),
        Some(&2)
    );
    assert!(samples.set_at(value.as_handle(), 2, AnyValue::new(&registry, 9i32)));
    assert_eq!(
        value.try_cast::<Buffer>(&registry).unwrap().samples,
        [1, 2, 9]
    );

    // Array members have no whole-value accessor.
    assert!(!samples
        .get(value.as_handle())
        .is_valid());
    assert!(!samples.set(value.as_handle(), AnyValue::new(&registry, 5i32)));

    // Indices at or past the extent miss without touching the array.
    assert!(!samples.get_at(value.as_handle(), 3).is_valid());
    assert!(!samples.set_at(value.as_handle(), 3, AnyValue::new(&registry, 7i32)));
    assert!(!samples.set_at(value.as_handle(), usize::MAX, AnyValue::new(&registry, 7i32)));
    assert_eq!(
        value.try_cast::<Buffer>(&registry).unwrap().samples,
        [1, 2, 9]
    );
}

static TEARDOWNS: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, PartialEq)]
struct Session {
    open: bool,
}

#[test]
fn test_destructor_lifecycle() {
    let mut registry = create_standard_registry().unwrap();
    let session = registry
        .register_eq::<Session>(TypeDesc::named("Session").with_traits(TypeTraits::class()))
        .unwrap();
    registry
        .link_dtor(DtorNode::new::<Session>(session, |s| {
            s.open = false;
            TEARDOWNS.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    let info = registry.resolve::<Session>().unwrap();
    TEARDOWNS.store(0, Ordering::SeqCst);

    // Explicit destroy requires the exact type.
    let mut external = Session { open: true };
    let handle = AnyHandle::from_mut(&registry, &mut external);
    assert!(info.destroy(handle));
    assert!(!external.open);
    assert_eq!(TEARDOWNS.load(Ordering::SeqCst), 1);

    let mut other = 5i32;
    assert!(!info.destroy(AnyHandle::from_mut(&registry, &mut other)));
    assert_eq!(TEARDOWNS.load(Ordering::SeqCst), 1);

    // Owned containers run the hook exactly once when they die.
    drop(AnyValue::new(&registry, Session { open: true }));
    assert_eq!(TEARDOWNS.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unregistered_types_are_invisible() {
    let mut registry = point_registry();
    assert!(registry.resolve::<Point>().is_some());

    registry.unregister::<Point>();
    assert!(registry.resolve::<Point>().is_none());
    assert!(registry.by_identifier("Point").is_none());

    // New erased values of the detached type come out empty.
    let value = AnyValue::new(&registry, Point { x: 1, y: 2 });
    assert!(!value.is_valid());
}
