//! Bundled sample classes and the self-checking scenario catalog
//!
//! `populate` defines a small zoo of interfaces and classes that `inspect`
//! can show. Every [`Sample`] runs against a freshly populated runtime and
//! fails with a message describing what it expected.

use anyhow::{bail, ensure, Context};
use mosaic_core::{
    ClassDefinition, ClassRef, InterfaceDefinition, InterfaceRef, LangError, Runtime,
    RuntimeConfig, Value,
};

/// One self-checking scenario
pub struct Sample {
    pub name: &'static str,
    pub run: fn(&Runtime) -> anyhow::Result<()>,
}

/// Create a runtime with every sample entity defined
pub fn runtime(config: RuntimeConfig) -> anyhow::Result<Runtime> {
    let runtime = Runtime::with_config(config);
    populate(&runtime)?;
    Ok(runtime)
}

fn text(s: &str) -> Result<Value, LangError> {
    Ok(Value::from(s))
}

/// Define the sample interfaces and classes in `runtime`
pub fn populate(runtime: &Runtime) -> anyhow::Result<()> {
    let speaker = runtime.define_interface(
        InterfaceDefinition::new("Speaker")
            .method("greet", |_, _| text("Speaker.greet()"))
            .unimplemented("name"),
    )?;
    runtime.define_class(
        ClassDefinition::new("Dog")
            .implements(&speaker)
            .method("name", |_, _| text("Rex")),
    )?;

    let a = runtime.define_interface(InterfaceDefinition::new("A"))?;
    runtime.define_interface(InterfaceDefinition::new("B").requires(&a))?;

    let animal = runtime.define_class(
        ClassDefinition::new("Animal")
            .method("describe", |_, _| text("animal"))
            .method("sound", |this, args| this.parent(args)),
    )?;
    let mammal = runtime.define_class(
        ClassDefinition::new("Mammal")
            .extends(&animal)
            .method("describe", |this, args| {
                Ok(Value::string(format!("mammal < {}", this.parent(args)?)))
            }),
    )?;
    runtime.define_class(
        ClassDefinition::new("Corgi")
            .extends(&mammal)
            .implements(&speaker)
            .method("name", |_, _| text("Biscuit"))
            .method("describe", |this, args| {
                Ok(Value::string(format!("corgi < {}", this.parent(args)?)))
            }),
    )?;

    let shape = runtime.define_class(
        ClassDefinition::new("Shape")
            .abstract_class()
            .method("area", |_, _| Ok(Value::from(0))),
    )?;
    runtime.define_class(
        ClassDefinition::new("Square")
            .extends(&shape)
            .method("_init", |this, args| {
                this.set("side", args.first().cloned().unwrap_or(Value::from(1)))?;
                Ok(Value::Undefined)
            })
            .method("area", |this, _| {
                let side = this.get("side")?.as_int().unwrap_or(0);
                Ok(Value::from(side * side))
            }),
    )?;

    let needs = runtime.define_interface(InterfaceDefinition::new("NeedsSize").unimplemented("size"))?;
    let gives = runtime.define_interface(
        InterfaceDefinition::new("GivesSize").method("size", |_, _| Ok(Value::from(4))),
    )?;
    runtime.define_class(
        ClassDefinition::new("Crate")
            .implements(&needs)
            .implements(&gives),
    )?;
    Ok(())
}

fn class(runtime: &Runtime, name: &str) -> anyhow::Result<ClassRef> {
    runtime
        .class(name)
        .with_context(|| format!("sample class {} is missing", name))
}

fn interface(runtime: &Runtime, name: &str) -> anyhow::Result<InterfaceRef> {
    runtime
        .interface(name)
        .with_context(|| format!("sample interface {} is missing", name))
}

fn expect_text(value: Value, expected: &str) -> anyhow::Result<()> {
    ensure!(
        value.as_str() == Some(expected),
        "expected {:?}, got {}",
        expected,
        value
    );
    Ok(())
}

/// The scenario catalog, in run order
pub fn samples() -> Vec<Sample> {
    vec![
        Sample {
            name: "speaker/dog-uses-interface-default",
            run: |rt| {
                let dog = class(rt, "Dog")?.new_instance()?;
                expect_text(dog.call("greet", &[])?, "Speaker.greet()")?;
                expect_text(dog.call("name", &[])?, "Rex")?;
                ensure!(dog.implements(&interface(rt, "Speaker")?), "Dog should implement Speaker");
                Ok(())
            },
        },
        Sample {
            name: "speaker/cat-missing-required-member",
            run: |rt| {
                let speaker = interface(rt, "Speaker")?;
                match rt.define_class(ClassDefinition::new("Cat").implements(&speaker)) {
                    Err(LangError::Composition(e)) if e.unimplemented == ["name"] => Ok(()),
                    Err(other) => bail!("wrong error: {}", other),
                    Ok(_) => bail!("Cat was accepted without `name`"),
                }
            },
        },
        Sample {
            name: "ordering/required-interface-declared-late",
            run: |rt| {
                let (a, b) = (interface(rt, "A")?, interface(rt, "B")?);
                match rt.define_class(ClassDefinition::new("BA").implements(&b).implements(&a)) {
                    Err(LangError::Composition(e)) if e.misordered == ["A"] => {}
                    Err(other) => bail!("wrong error: {}", other),
                    Ok(_) => bail!("[B, A] was accepted"),
                }
                let ab = rt.define_class(ClassDefinition::new("AB").implements(&a).implements(&b))?;
                let obj = ab.new_instance()?;
                ensure!(obj.implements(&a) && obj.implements(&b), "AB should implement A and B");
                Ok(())
            },
        },
        Sample {
            name: "ordering/requirement-met-by-superclass",
            run: |rt| {
                let (a, b) = (interface(rt, "A")?, interface(rt, "B")?);
                let parent = rt.define_class(ClassDefinition::new("HasA").implements(&a))?;
                let child = rt.define_class(ClassDefinition::new("AddsB").extends(&parent).implements(&b))?;
                ensure!(child.implements(&a), "AddsB should inherit A");
                Ok(())
            },
        },
        Sample {
            name: "members/later-interface-satisfies-earlier",
            run: |rt| {
                let obj = class(rt, "Crate")?.new_instance()?;
                ensure!(obj.call("size", &[])? == Value::from(4), "Crate.size() should be 4");
                let (needs, gives) = (interface(rt, "NeedsSize")?, interface(rt, "GivesSize")?);
                ensure!(
                    rt.define_class(ClassDefinition::new("Crate2").implements(&gives).implements(&needs))
                        .is_err(),
                    "a later sentinel should hide an earlier default"
                );
                Ok(())
            },
        },
        Sample {
            name: "chaining/parent-walks-ancestors",
            run: |rt| {
                let corgi = class(rt, "Corgi")?.new_instance()?;
                expect_text(corgi.call("describe", &[])?, "corgi < mammal < animal")?;
                Ok(())
            },
        },
        Sample {
            name: "chaining/parent-from-root-member-fails",
            run: |rt| {
                let corgi = class(rt, "Corgi")?.new_instance()?;
                match corgi.call("sound", &[]) {
                    Err(LangError::Chain(_)) => {}
                    other => bail!("expected a chain error, got {:?}", other),
                }
                ensure!(corgi.call_depth() == 0, "call frames leaked");
                Ok(())
            },
        },
        Sample {
            name: "chaining/generic-form-survives-override",
            run: |rt| {
                let speaker = interface(rt, "Speaker")?;
                let loud = rt.define_class(
                    ClassDefinition::new("LoudDog")
                        .extends(&class(rt, "Dog")?)
                        .method("greet", |_, _| text("WOOF")),
                )?;
                let obj = loud.new_instance()?;
                expect_text(obj.call("greet", &[])?, "WOOF")?;
                for _ in 0..2 {
                    expect_text(speaker.call("greet", &obj, &[])?, "Speaker.greet()")?;
                }
                Ok(())
            },
        },
        Sample {
            name: "construction/interface-not-instantiable",
            run: |rt| {
                ensure!(
                    interface(rt, "Speaker")?.instantiate(&[]).is_err(),
                    "interfaces must not be constructible"
                );
                Ok(())
            },
        },
        Sample {
            name: "construction/abstract-class",
            run: |rt| {
                ensure!(class(rt, "Shape")?.new_instance().is_err(), "Shape is abstract");
                let square = class(rt, "Square")?.instantiate(&[Value::from(3)])?;
                ensure!(square.call("area", &[])? == Value::from(9), "Square(3).area() should be 9");
                Ok(())
            },
        },
    ]
}
