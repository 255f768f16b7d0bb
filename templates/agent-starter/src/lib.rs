use jvmti_harness::prelude::*;
use jvmti_harness::{inspect, redefine};

#[derive(Default)]
struct MyAgent;

impl Agent for MyAgent {
    fn on_load(&self, vm: *mut jni::JavaVM, options: &OptionTable) -> jni::jint {
        log::info!("on_load: {}", options.raw());

        let jvmti = match Jvmti::new(vm) {
            Ok(env) => env,
            Err(code) => {
                log::error!("failed to get JVMTI: {}", code);
                return jni::JNI_ERR;
            }
        };

        let mut caps = jvmti::jvmtiCapabilities::default();
        caps.set_can_redefine_classes(true);
        if let Err(err) = jvmti.add_capabilities(&caps) {
            log::error!("failed to add capabilities: {}", err);
            redefine::agent_failed();
            return jni::JNI_ERR;
        }

        match inspect::Phase::current(&jvmti) {
            Ok(phase) => log::info!("phase: {:?}", phase),
            Err(err) => log::warn!("phase unknown: {}", err),
        }

        let class_name = match options.find_string_value("class", "nsk/share/Example") {
            Ok(name) => name.to_string(),
            Err(err) => {
                log::error!("{}", err);
                return jni::JNI_ERR;
            }
        };
        log::info!("will redefine {} after {} min", class_name, options.wait_time());

        // Redefine once the class is loaded, e.g. from a ClassPrepare handler:
        //   redefine::redefine_class(&jvmti, class, &class_name);

        jni::JNI_OK
    }
}

export_agent!(MyAgent);
export_harness_natives!();
